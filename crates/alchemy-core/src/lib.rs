//! Core types for Alchemy: the question taxonomy, the name resolver, the
//! survey platform payload schemas and the flattener that turns nested
//! responses into long-format answer rows.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and the survey source are reached through the traits in [`store`]
//! and [`source`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod flatten;
pub mod model;
pub mod naming;
pub mod payload;
pub mod source;
pub mod store;
pub mod taxonomy;

pub use error::{Error, Result};
