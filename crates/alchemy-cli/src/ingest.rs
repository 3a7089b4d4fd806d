//! One survey, end to end: fetch, flatten, store.
//!
//! Everything is fetched and flattened before the store is touched, so a
//! fatal fetch or flattening error leaves the store exactly as it was. The
//! store then writes the batch as one unit of work.

use alchemy_core::{
  flatten::{flatten_questions, flatten_response},
  model::{SurveyBatch, SurveyRecord},
  payload::{Page, QuestionPayload},
  source::SurveySource,
  store::{IngestSummary, SurveyStore},
};

use crate::error::{IngestError, Result};

/// What one successful [`ingest_survey`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  pub questions:         usize,
  pub options:           usize,
  pub responses:         usize,
  /// Answered questions seen across all responses.
  pub potential_answers: usize,
  /// Single-select answers without a selection, skipped.
  pub null_answers:      usize,
  pub summary:           IngestSummary,
}

pub async fn ingest_survey<S, T>(
  source: &S,
  store: &T,
  survey_id: i64,
) -> Result<IngestReport>
where
  S: SurveySource,
  T: SurveyStore,
{
  tracing::info!(survey_id, "processing survey");

  // ── Survey ────────────────────────────────────────────────────────────
  let survey = source
    .survey(survey_id)
    .await
    .map_err(|e| fetch_error(survey_id, "the survey", e))?;
  if survey.id != survey_id {
    return Err(IngestError::SurveyMismatch {
      requested: survey_id,
      received:  survey.id,
    });
  }

  // ── Questions ─────────────────────────────────────────────────────────
  let question_payloads = fetch_questions(source, survey_id).await?;
  let questions = flatten_questions(survey_id, question_payloads)
    .map_err(|source| IngestError::Flatten { survey_id, source })?;
  let catalog = questions.catalog();
  tracing::info!(
    survey_id,
    questions = questions.questions.len(),
    options = questions.options.len(),
    "flattened question metadata"
  );

  let mut report = IngestReport {
    questions: questions.questions.len(),
    options: questions.options.len(),
    ..IngestReport::default()
  };

  // ── Responses ─────────────────────────────────────────────────────────
  let mut responses = Vec::new();
  let mut answers = Vec::new();
  let mut page = 1;
  loop {
    let listing = source
      .responses(survey_id, page)
      .await
      .map_err(|e| fetch_error(survey_id, "responses", e))?;
    if page == 1 {
      tracing::info!(
        survey_id,
        total_pages = listing.total_pages,
        total_count = listing.total_count,
        "fetching responses"
      );
    }

    let mut potential = 0;
    let mut nulls = 0;
    for payload in listing.data {
      let flat = flatten_response(survey_id, payload, &catalog)
        .map_err(|source| IngestError::Flatten { survey_id, source })?;
      potential += flat.potential_answers;
      nulls += flat.null_answers;
      responses.push(flat.response);
      answers.extend(flat.answers);
    }
    tracing::info!(
      survey_id,
      page,
      potential_answers = potential,
      null_answers = nulls,
      "processed response page"
    );
    report.potential_answers += potential;
    report.null_answers += nulls;

    if page >= listing.total_pages {
      break;
    }
    page += 1;
  }
  report.responses = responses.len();

  // ── Store ─────────────────────────────────────────────────────────────
  let batch = SurveyBatch {
    survey: SurveyRecord {
      id:    survey.id,
      title: survey.title,
    },
    questions: questions.questions,
    options: questions.options,
    responses,
    answers,
  };
  report.summary = store
    .ingest(batch)
    .await
    .map_err(|e| IngestError::Store { survey_id, source: e.into() })?;

  let s = &report.summary;
  tracing::info!(
    survey_id,
    surveys = s.surveys_inserted,
    questions = s.questions_inserted,
    options = s.options_inserted,
    responses = s.responses_inserted,
    answers = s.answers_inserted,
    failed_answers = s.answers_failed,
    replaced_answers = s.answers_replaced,
    drift_corrections = s.drift_corrections,
    "committed survey"
  );
  Ok(report)
}

/// Fetch every page of the question listing, in order.
async fn fetch_questions<S: SurveySource>(
  source: &S,
  survey_id: i64,
) -> Result<Vec<QuestionPayload>> {
  let mut out = Vec::new();
  let mut page = 1;
  loop {
    let Page { total_pages, data, .. } = source
      .questions(survey_id, page)
      .await
      .map_err(|e| fetch_error(survey_id, "questions", e))?;
    tracing::debug!(survey_id, page, total_pages, "fetched question page");
    out.extend(data);
    if page >= total_pages {
      return Ok(out);
    }
    page += 1;
  }
}

fn fetch_error<E>(survey_id: i64, what: &'static str, e: E) -> IngestError
where
  E: std::error::Error + Send + Sync + 'static,
{
  IngestError::Source { survey_id, what, source: Box::new(e) }
}
