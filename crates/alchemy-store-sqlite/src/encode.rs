//! Row types read straight out of SQLite and their conversion into domain
//! types.
//!
//! Enumerations are stored as their integer codes; decoding an unknown code
//! is an error rather than a silent default.

use std::collections::HashMap;

use alchemy_core::{
  model::LongRecord, naming::display_name, taxonomy::QuestionType,
};

use crate::Result;

/// Declared option labels per `(survey_id, question_id)`, in declaration
/// order.
pub type OptionLabels = HashMap<(i64, i64), Vec<String>>;

/// Raw columns of one long-format row, in `SELECT` order.
pub struct RawLongRecord {
  pub survey_id:          i64,
  pub response_id:        i64,
  pub shortname:          Option<String>,
  pub title:              String,
  pub subquestion:        Option<String>,
  pub subquestion_type:   Option<i64>,
  pub option:             Option<String>,
  pub option_order:       Option<i64>,
  /// Question that declares `option`.
  pub option_question_id: Option<i64>,
  pub answer:             Option<String>,
  pub question_type:      i64,
}

impl RawLongRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      survey_id:          row.get(0)?,
      response_id:        row.get(1)?,
      shortname:          row.get(2)?,
      title:              row.get(3)?,
      subquestion:        row.get(4)?,
      subquestion_type:   row.get(5)?,
      option:             row.get(6)?,
      option_order:       row.get(7)?,
      option_question_id: row.get(8)?,
      answer:             row.get(9)?,
      question_type:      row.get(10)?,
    })
  }

  pub fn into_record(self, labels: &OptionLabels) -> Result<LongRecord> {
    let option_labels = self
      .option_question_id
      .and_then(|id| labels.get(&(self.survey_id, id)))
      .cloned()
      .unwrap_or_default();

    Ok(LongRecord {
      survey_id: self.survey_id,
      response_id: self.response_id,
      question: display_name(self.shortname.as_deref(), &self.title),
      subquestion: self.subquestion,
      subquestion_type: self
        .subquestion_type
        .map(QuestionType::from_code)
        .transpose()?,
      option: self.option,
      option_order: self.option_order,
      option_labels,
      answer: self.answer,
      question_type: QuestionType::from_code(self.question_type)?,
    })
  }
}
