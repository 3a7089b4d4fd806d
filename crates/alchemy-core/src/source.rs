//! The `SurveySource` trait — where raw payloads come from.
//!
//! The HTTP client in `alchemy-cli` implements it against the survey
//! platform's REST API; tests implement it over in-memory fixtures.

use std::future::Future;

use crate::payload::{Page, QuestionPayload, ResponsePayload, SurveyPayload};

pub trait SurveySource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `GET /survey/{id}`
  fn survey(
    &self,
    survey_id: i64,
  ) -> impl Future<Output = Result<SurveyPayload, Self::Error>> + Send + '_;

  /// `GET /survey/{id}/surveyquestion`, one page (1-based).
  fn questions(
    &self,
    survey_id: i64,
    page: u32,
  ) -> impl Future<Output = Result<Page<QuestionPayload>, Self::Error>> + Send + '_;

  /// `GET /survey/{id}/surveyresponse`, one page (1-based).
  fn responses(
    &self,
    survey_id: i64,
    page: u32,
  ) -> impl Future<Output = Result<Page<ResponsePayload>, Self::Error>> + Send + '_;
}
