//! The `SurveyStore` trait and its result types.
//!
//! The trait is implemented by storage backends (e.g.
//! `alchemy-store-sqlite`). Ingestion and reshaping depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::model::{LongRecord, SurveyBatch, SurveyFilter};

// ─── Results ─────────────────────────────────────────────────────────────────

/// What one [`SurveyStore::ingest`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
  pub surveys_inserted:   usize,
  pub questions_inserted: usize,
  pub options_inserted:   usize,
  pub responses_inserted: usize,
  pub answers_inserted:   usize,
  /// Answer rows that failed to insert; logged and skipped.
  pub answers_failed:     usize,
  /// Answer rows from earlier runs replaced by this one.
  pub answers_replaced:   usize,
  /// Descriptive fields corrected in place on already-known rows.
  pub drift_corrections:  usize,
}

/// Row counts per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
  pub surveys:   usize,
  pub questions: usize,
  pub options:   usize,
  pub responses: usize,
  pub answers:   usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the long-format answer store.
///
/// Metadata rows (survey, question, option, response) are inserted once per
/// identity and never deleted. When a descriptive field of a known row
/// differs from the incoming batch, the stored value is corrected and the
/// correction logged ("heal and warn").
pub trait SurveyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one survey's batch as a single all-or-nothing unit.
  ///
  /// Any metadata failure rolls the whole batch back. Individual answer rows
  /// that fail are logged, counted in
  /// [`IngestSummary::answers_failed`] and skipped. Answers already stored
  /// for a response in the batch are replaced.
  fn ingest(
    &self,
    batch: SurveyBatch,
  ) -> impl Future<Output = Result<IngestSummary, Self::Error>> + Send + '_;

  /// Reconstruct the long-format answer table, ordered by survey, response
  /// and question.
  fn records<'a>(
    &'a self,
    filter: &'a SurveyFilter,
  ) -> impl Future<Output = Result<Vec<LongRecord>, Self::Error>> + Send + 'a;

  fn counts(
    &self,
  ) -> impl Future<Output = Result<EntityCounts, Self::Error>> + Send + '_;
}
