//! Payload flattener: nested question trees and responses in, flat
//! relational records out.
//!
//! Questions are lifted breadth-first so sub-questions of a two-layer question
//! sit in the same list as top-level ones, each remembering its parent.
//! Answers are emitted according to the [`Bucket`] of the question they
//! belong to; see [`flatten_response`].

use std::collections::VecDeque;

use crate::{
  Error, Result,
  model::{
    AnswerRecord, NONE_ID, OptionRecord, QuestionCatalog, QuestionRecord,
    QuestionSet, ResponseRecord,
  },
  payload::{AnswerPayload, Field, QuestionPayload, ResponsePayload},
  taxonomy::{BaseType, Bucket, LeafPolicy, QuestionType},
};

/// Presence flags are stored as text so the answer column stays uniform.
const PRESENT: &str = "1";
const NOT_PRESENT: &str = "0";

/// Value recorded for a hidden question whose answer key is absent.
const HIDDEN_DEFAULT: &str = "0";

// ─── Questions ───────────────────────────────────────────────────────────────

/// Flatten a survey's question tree.
///
/// Fails on the first question whose type or base type is not in the
/// taxonomy; nothing is inferred.
pub fn flatten_questions(
  survey_id: i64,
  payloads: Vec<QuestionPayload>,
) -> Result<QuestionSet> {
  let mut set = QuestionSet::default();
  let mut queue: VecDeque<(QuestionPayload, Option<i64>)> =
    payloads.into_iter().map(|q| (q, None)).collect();

  while let Some((payload, parent_id)) = queue.pop_front() {
    let question_type = QuestionType::from_tag(&payload.kind)?;
    let base_type = BaseType::from_tag(&payload.base_type)?;
    let title = payload.title.english;
    let shortname = payload.shortname.filter(|s| !s.is_empty());

    for (order, option) in payload.options.into_iter().enumerate() {
      set.options.push(OptionRecord {
        survey_id,
        id: option.id,
        question_id: payload.id,
        value: option.value,
        option_order: order as i64,
      });
    }

    queue.extend(
      payload
        .sub_questions
        .into_iter()
        .map(|sub| (sub, Some(payload.id))),
    );

    set.questions.push(QuestionRecord {
      survey_id,
      id: payload.id,
      parent_id,
      title,
      shortname,
      base_type,
      question_type,
    });
  }

  Ok(set)
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// The records produced from one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedResponse {
  pub response:          ResponseRecord,
  pub answers:           Vec<AnswerRecord>,
  /// Answered questions in the payload, before any policy is applied.
  pub potential_answers: usize,
  /// Single-select answers without a selection; skipped, not errors.
  pub null_answers:      usize,
}

/// Flatten one response against the questions ingested in the same run.
pub fn flatten_response(
  survey_id: i64,
  payload: ResponsePayload,
  catalog: &QuestionCatalog,
) -> Result<FlattenedResponse> {
  let response = ResponseRecord { survey_id, id: payload.id };
  let mut out = FlattenedResponse {
    response,
    answers: Vec::new(),
    potential_answers: payload.survey_data.len(),
    null_answers: 0,
  };

  for answer in payload.survey_data {
    let question_type = lookup(catalog, response.id, answer.id)?;
    let (question_id, sub_question_id) = match answer.parent {
      Some(parent) => {
        lookup(catalog, response.id, parent)?;
        (parent, answer.id)
      }
      None => (answer.id, NONE_ID),
    };
    let mut emitter = Emitter {
      survey_id,
      response_id: response.id,
      question_id,
      sub_question_id,
      out: &mut out,
    };

    match question_type.bucket() {
      Bucket::Hidden => {
        let value = match answer.answer {
          Field::Absent => Some(HIDDEN_DEFAULT.to_owned()),
          field => field.into_value(),
        };
        emitter.emit(NONE_ID, value);
      }
      Bucket::TwoLayer => {
        for sub_answer in answer.sub_questions {
          let sub_type = lookup(catalog, response.id, sub_answer.id)?;
          let Some(policy) = sub_type.bucket().leaf() else {
            return Err(Error::UnhandledSubQuestion {
              question_id,
              sub_question_id: sub_answer.id,
              question_type: sub_type,
            });
          };
          emitter.sub_question_id = sub_answer.id;
          emitter.leaf(policy, sub_answer);
        }
      }
      bucket => match bucket.leaf() {
        Some(policy) => emitter.leaf(policy, answer),
        None => {
          return Err(Error::UnsupportedAnswer {
            question_id: answer.id,
            question_type,
          });
        }
      },
    }
  }

  Ok(out)
}

fn lookup(
  catalog: &QuestionCatalog,
  response_id: i64,
  question_id: i64,
) -> Result<QuestionType> {
  catalog
    .get(question_id)
    .ok_or(Error::QuestionNotFound { response_id, question_id })
}

/// Writes answer rows sharing one `(response, question, sub-question)` key.
struct Emitter<'a> {
  survey_id:       i64,
  response_id:     i64,
  question_id:     i64,
  sub_question_id: i64,
  out:             &'a mut FlattenedResponse,
}

impl Emitter<'_> {
  fn emit(&mut self, option_id: i64, answer: Option<String>) {
    self.out.answers.push(AnswerRecord {
      survey_id: self.survey_id,
      response_id: self.response_id,
      question_id: self.question_id,
      sub_question_id: self.sub_question_id,
      option_id,
      answer,
    });
  }

  fn leaf(&mut self, policy: LeafPolicy, answer: AnswerPayload) {
    match policy {
      LeafPolicy::SingleSelect => match answer.answer_id {
        Some(option_id) => {
          self.emit(option_id, Some(flag(answer.answer.is_present())));
        }
        None => self.out.null_answers += 1,
      },
      LeafPolicy::SingleValue => self.emit(NONE_ID, answer.answer.into_value()),
      LeafPolicy::MultiSelect => {
        for option in answer.options {
          self.emit(option.id, Some(flag(option.answer.is_present())));
        }
      }
      LeafPolicy::MultiValue => {
        for option in answer.options {
          self.emit(option.id, option.answer.into_value());
        }
      }
    }
  }
}

fn flag(present: bool) -> String {
  if present { PRESENT } else { NOT_PRESENT }.to_owned()
}
