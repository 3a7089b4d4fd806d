//! Error types for `alchemy-core`.

use thiserror::Error;

use crate::taxonomy::QuestionType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("question type {0:?} is missing from the lookup table")]
  UnknownQuestionType(String),

  #[error("base type {0:?} is missing from the lookup table")]
  UnknownBaseType(String),

  #[error("unknown question type code: {0}")]
  UnknownQuestionTypeCode(i64),

  #[error("unknown base type code: {0}")]
  UnknownBaseTypeCode(i64),

  #[error("no question {question_id} for an answer in response {response_id}")]
  QuestionNotFound { response_id: i64, question_id: i64 },

  #[error(
    "cannot flatten an answer to question {question_id} of type {question_type}"
  )]
  UnsupportedAnswer {
    question_id:   i64,
    question_type: QuestionType,
  },

  #[error(
    "sub-question {sub_question_id} of question {question_id} has unhandled \
     type {question_type}"
  )]
  UnhandledSubQuestion {
    question_id:     i64,
    sub_question_id: i64,
    question_type:   QuestionType,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
