//! Ingestion side of Alchemy: the survey platform client, runtime settings
//! and the per-survey orchestration behind the `alchemy` binary.

pub mod client;
pub mod error;
pub mod ingest;
pub mod settings;

pub use error::IngestError;
pub use ingest::{IngestReport, ingest_survey};
