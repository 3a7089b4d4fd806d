//! Normalised records — the relational shape the flattener produces and the
//! store persists — plus the long-format row the store hands back.
//!
//! `sub_question_id = 0` and `option_id = 0` are sentinels meaning "not a
//! sub-question answer" and "not an option-keyed answer".

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::taxonomy::{BaseType, QuestionType};

/// Sentinel for "no sub-question" / "no option".
pub const NONE_ID: i64 = 0;

// ─── Metadata records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
  pub id:    i64,
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
  pub survey_id:     i64,
  pub id:            i64,
  /// Owning two-layer question, when this is one of its sub-questions.
  pub parent_id:     Option<i64>,
  pub title:         String,
  /// `None` when the platform sent no shortname or an empty one.
  pub shortname:     Option<String>,
  pub base_type:     BaseType,
  pub question_type: QuestionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
  pub survey_id:    i64,
  pub id:           i64,
  pub question_id:  i64,
  pub value:        String,
  /// 0-based declaration order within the owning question.
  pub option_order: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
  pub survey_id: i64,
  pub id:        i64,
}

/// The fact row: one atomic answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
  pub survey_id:       i64,
  pub response_id:     i64,
  pub question_id:     i64,
  pub sub_question_id: i64,
  pub option_id:       i64,
  pub answer:          Option<String>,
}

// ─── Batches ─────────────────────────────────────────────────────────────────

/// Questions lifted out of their tree, with their options.
#[derive(Debug, Clone, Default)]
pub struct QuestionSet {
  pub questions: Vec<QuestionRecord>,
  pub options:   Vec<OptionRecord>,
}

impl QuestionSet {
  /// Lookup table used while flattening answers.
  pub fn catalog(&self) -> QuestionCatalog {
    QuestionCatalog(
      self
        .questions
        .iter()
        .map(|q| (q.id, q.question_type))
        .collect(),
    )
  }
}

/// Question id → type, for every question ingested in the current run.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog(HashMap<i64, QuestionType>);

impl QuestionCatalog {
  pub fn get(&self, question_id: i64) -> Option<QuestionType> {
    self.0.get(&question_id).copied()
  }
}

/// Everything one survey's ingestion writes, handed to the store in a single
/// unit of work.
#[derive(Debug, Clone)]
pub struct SurveyBatch {
  pub survey:    SurveyRecord,
  pub questions: Vec<QuestionRecord>,
  pub options:   Vec<OptionRecord>,
  pub responses: Vec<ResponseRecord>,
  pub answers:   Vec<AnswerRecord>,
}

// ─── Long format ─────────────────────────────────────────────────────────────

/// One row of the long-format answer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRecord {
  pub survey_id:        i64,
  pub response_id:      i64,
  /// The owning question's display name: its shortname, or its title when
  /// it has none.
  pub question:         String,
  /// The sub-question's title, for two-layer answers.
  pub subquestion:      Option<String>,
  pub subquestion_type: Option<QuestionType>,
  pub option:           Option<String>,
  pub option_order:     Option<i64>,
  /// Every label declared alongside `option`, in declaration order. Empty
  /// when the row has no option.
  #[serde(default)]
  pub option_labels:    Vec<String>,
  pub answer:           Option<String>,
  pub question_type:    QuestionType,
}

/// Restricts queries and reshapes to a set of surveys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SurveyFilter {
  #[default]
  All,
  Only(BTreeSet<i64>),
}

impl SurveyFilter {
  pub fn only(ids: impl IntoIterator<Item = i64>) -> Self {
    Self::Only(ids.into_iter().collect())
  }

  pub fn matches(&self, survey_id: i64) -> bool {
    match self {
      Self::All => true,
      Self::Only(ids) => ids.contains(&survey_id),
    }
  }
}

impl From<Vec<i64>> for SurveyFilter {
  /// An empty list means no restriction.
  fn from(ids: Vec<i64>) -> Self {
    if ids.is_empty() { Self::All } else { Self::only(ids) }
  }
}
