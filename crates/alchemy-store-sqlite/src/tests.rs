//! Integration tests for `SqliteStore` against an in-memory database.

use alchemy_core::{
  model::{
    AnswerRecord, OptionRecord, QuestionRecord, ResponseRecord, SurveyBatch,
    SurveyFilter, SurveyRecord,
  },
  store::{EntityCounts, SurveyStore},
  taxonomy::{BaseType, QuestionType},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const SURVEY: i64 = 7982666;

fn question(
  id: i64,
  parent_id: Option<i64>,
  shortname: &str,
  question_type: QuestionType,
) -> QuestionRecord {
  QuestionRecord {
    survey_id: SURVEY,
    id,
    parent_id,
    title: format!("{shortname} title"),
    shortname: Some(shortname.into()),
    base_type: BaseType::Question,
    question_type,
  }
}

fn option(id: i64, question_id: i64, value: &str, order: i64) -> OptionRecord {
  OptionRecord {
    survey_id: SURVEY,
    id,
    question_id,
    value: value.into(),
    option_order: order,
  }
}

fn answer(
  response_id: i64,
  question_id: i64,
  sub_question_id: i64,
  option_id: i64,
  value: Option<&str>,
) -> AnswerRecord {
  AnswerRecord {
    survey_id: SURVEY,
    response_id,
    question_id,
    sub_question_id,
    option_id,
    answer: value.map(str::to_owned),
  }
}

/// A radio question, a textbox, and a matrix with one sub-question, answered
/// by two respondents.
fn batch() -> SurveyBatch {
  SurveyBatch {
    survey:    SurveyRecord { id: SURVEY, title: "Omnibus".into() },
    questions: vec![
      question(1, None, "mood", QuestionType::Radio),
      question(2, None, "name", QuestionType::Textbox),
      question(3, None, "grid", QuestionType::Matrix),
      question(4, Some(3), "Speed", QuestionType::Checkbox),
    ],
    options:   vec![
      option(10001, 1, "No", 0),
      option(10002, 1, "Maybe", 1),
      option(10003, 1, "Yes", 2),
      option(10010, 3, "Wifi", 0),
    ],
    responses: vec![
      ResponseRecord { survey_id: SURVEY, id: 100 },
      ResponseRecord { survey_id: SURVEY, id: 101 },
    ],
    answers:   vec![
      answer(100, 1, 0, 10003, Some("1")),
      answer(100, 2, 0, 0, Some("Ada")),
      answer(100, 3, 4, 10010, Some("1")),
      answer(101, 1, 0, 10001, Some("1")),
    ],
  }
}

async fn question_title(s: &SqliteStore, id: i64) -> String {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(
        "SELECT title FROM question WHERE survey_id = ?1 AND id = ?2",
        rusqlite::params![SURVEY, id],
        |r| r.get(0),
      )?)
    })
    .await
    .unwrap()
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_inserts_every_entity() {
  let s = store().await;

  let summary = s.ingest(batch()).await.unwrap();
  assert_eq!(summary.surveys_inserted, 1);
  assert_eq!(summary.questions_inserted, 4);
  assert_eq!(summary.options_inserted, 4);
  assert_eq!(summary.responses_inserted, 2);
  assert_eq!(summary.answers_inserted, 4);
  assert_eq!(summary.answers_failed, 0);
  assert_eq!(summary.drift_corrections, 0);

  assert_eq!(
    s.counts().await.unwrap(),
    EntityCounts {
      surveys:   1,
      questions: 4,
      options:   4,
      responses: 2,
      answers:   4,
    }
  );
}

#[tokio::test]
async fn reingesting_is_idempotent() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();
  let before = s.counts().await.unwrap();

  let summary = s.ingest(batch()).await.unwrap();
  assert_eq!(summary.surveys_inserted, 0);
  assert_eq!(summary.questions_inserted, 0);
  assert_eq!(summary.options_inserted, 0);
  assert_eq!(summary.responses_inserted, 0);
  assert_eq!(summary.drift_corrections, 0);
  assert_eq!(summary.answers_replaced, 4);
  assert_eq!(summary.answers_inserted, 4);

  assert_eq!(s.counts().await.unwrap(), before);
}

#[tokio::test]
async fn title_drift_is_healed_in_place() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();

  let mut changed = batch();
  changed.questions[1].title = "What is your full name?".into();
  let summary = s.ingest(changed).await.unwrap();

  assert_eq!(summary.drift_corrections, 1);
  assert_eq!(summary.questions_inserted, 0);
  assert_eq!(s.counts().await.unwrap().questions, 4);
  assert_eq!(question_title(&s, 2).await, "What is your full name?");
  assert_eq!(question_title(&s, 1).await, "mood title");
}

#[tokio::test]
async fn title_drift_without_shortname_is_one_correction() {
  let s = store().await;
  let mut b = batch();
  b.questions[1].shortname = None;
  b.questions[1].title = "Old title".into();
  s.ingest(b.clone()).await.unwrap();

  b.questions[1].title = "New title".into();
  let summary = s.ingest(b).await.unwrap();
  assert_eq!(summary.drift_corrections, 1);
  assert_eq!(question_title(&s, 2).await, "New title");

  let records = s.records(&SurveyFilter::All).await.unwrap();
  let unnamed = records
    .iter()
    .find(|r| r.answer.as_deref() == Some("Ada"))
    .unwrap();
  assert_eq!(unnamed.question, "New title");
}

#[tokio::test]
async fn missing_shortname_keeps_the_stored_one() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();

  let mut b = batch();
  b.questions[0].shortname = None;
  let summary = s.ingest(b).await.unwrap();
  assert_eq!(summary.drift_corrections, 0);

  let records = s.records(&SurveyFilter::All).await.unwrap();
  assert!(records.iter().any(|r| r.question == "mood"));
}

#[tokio::test]
async fn option_and_survey_drift_are_counted() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();

  let mut changed = batch();
  changed.survey.title = "Omnibus (fixed)".into();
  changed.options[0].value = "Nope".into();
  let summary = s.ingest(changed).await.unwrap();
  assert_eq!(summary.drift_corrections, 2);

  let records = s.records(&SurveyFilter::All).await.unwrap();
  assert!(records.iter().any(|r| r.option.as_deref() == Some("Nope")));
}

#[tokio::test]
async fn failing_answer_rows_are_skipped() {
  let s = store().await;
  let mut b = batch();
  // Same (response, question, sub-question, option) tuple twice.
  b.answers.push(answer(100, 2, 0, 0, Some("Grace")));

  let summary = s.ingest(b).await.unwrap();
  assert_eq!(summary.answers_inserted, 4);
  assert_eq!(summary.answers_failed, 1);

  let records = s.records(&SurveyFilter::All).await.unwrap();
  let name = records.iter().find(|r| r.question == "name").unwrap();
  assert_eq!(name.answer.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn metadata_failure_rolls_back_the_survey() {
  let s = store().await;
  let mut b = batch();
  // Option pointing at a question that does not exist.
  b.options.push(option(10099, 999, "Orphan", 0));

  let err = s.ingest(b).await.unwrap_err();
  assert!(matches!(err, Error::Sqlite(_)));
  assert_eq!(s.counts().await.unwrap(), EntityCounts::default());
}

#[tokio::test]
async fn failed_survey_leaves_earlier_surveys_intact() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();
  let before = s.counts().await.unwrap();

  let mut b = batch();
  b.survey.id = 2;
  for q in &mut b.questions {
    q.survey_id = 2;
  }
  b.options.clear();
  b.responses.clear();
  b.answers.clear();
  b.questions.push(QuestionRecord {
    parent_id: Some(404),
    ..question(5, None, "orphan", QuestionType::Radio)
  });

  assert!(s.ingest(b).await.is_err());
  assert_eq!(s.counts().await.unwrap(), before);
}

// ─── Long-format query ───────────────────────────────────────────────────────

#[tokio::test]
async fn records_join_names_and_options() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();

  let records = s.records(&SurveyFilter::All).await.unwrap();
  assert_eq!(records.len(), 4);

  // Ordered by survey, response, then question name.
  let keys: Vec<(i64, &str)> = records
    .iter()
    .map(|r| (r.response_id, r.question.as_str()))
    .collect();
  assert_eq!(keys, vec![(100, "grid"), (100, "mood"), (100, "name"), (101, "mood")]);

  let grid = &records[0];
  assert_eq!(grid.question_type, QuestionType::Matrix);
  assert_eq!(grid.subquestion.as_deref(), Some("Speed title"));
  assert_eq!(grid.subquestion_type, Some(QuestionType::Checkbox));
  assert_eq!(grid.option.as_deref(), Some("Wifi"));

  assert_eq!(grid.option_labels, ["Wifi"]);

  let mood = &records[1];
  assert_eq!(mood.option.as_deref(), Some("Yes"));
  assert_eq!(mood.option_order, Some(2));
  assert_eq!(mood.option_labels, ["No", "Maybe", "Yes"]);
  assert_eq!(mood.subquestion, None);

  let name = &records[2];
  assert_eq!(name.option, None);
  assert_eq!(name.option_order, None);
  assert!(name.option_labels.is_empty());
  assert_eq!(name.answer.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn records_filter_by_survey() {
  let s = store().await;
  s.ingest(batch()).await.unwrap();

  let mut other = batch();
  other.survey.id = 8002909;
  for q in &mut other.questions {
    q.survey_id = 8002909;
  }
  for o in &mut other.options {
    o.survey_id = 8002909;
  }
  for r in &mut other.responses {
    r.survey_id = 8002909;
  }
  for a in &mut other.answers {
    a.survey_id = 8002909;
  }
  s.ingest(other).await.unwrap();

  assert_eq!(s.records(&SurveyFilter::All).await.unwrap().len(), 8);

  let only = s.records(&SurveyFilter::only([8002909])).await.unwrap();
  assert_eq!(only.len(), 4);
  assert!(only.iter().all(|r| r.survey_id == 8002909));

  let none = s.records(&SurveyFilter::only([])).await.unwrap();
  assert!(none.is_empty());
}
