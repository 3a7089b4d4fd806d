use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why one survey's ingestion was abandoned.
///
/// Every variant is fatal for that survey only. Errors raised before the
/// store is called leave it untouched; store errors have been rolled back.
#[derive(Debug, Error)]
pub enum IngestError {
  #[error("failed to fetch {what} for survey {survey_id}")]
  Source {
    survey_id: i64,
    what:      &'static str,
    #[source]
    source:    BoxError,
  },

  #[error("requested survey {requested} but the platform returned {received}")]
  SurveyMismatch { requested: i64, received: i64 },

  #[error("failed to flatten survey {survey_id}")]
  Flatten {
    survey_id: i64,
    #[source]
    source:    alchemy_core::Error,
  },

  #[error("failed to write survey {survey_id} to the store")]
  Store {
    survey_id: i64,
    #[source]
    source:    BoxError,
  },
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
