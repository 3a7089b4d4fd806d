//! Multi mode: three typed pivots keyed by `(question, subquestion, option)`.
//!
//! - single-select rows land in `(question, subquestion, "")` as an
//!   [`OrdinalValue`] over the question's declared option labels;
//! - multi-select rows land in `(question, subquestion, option)` as a
//!   tri-state flag;
//! - single-value, multi-value and hidden rows land in
//!   `(question, subquestion, option)` as the raw answer.
//!
//! Two-layer rows are routed by their sub-question's bucket. The three
//! blocks are concatenated in that order with outer row alignment.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use alchemy_core::{model::LongRecord, taxonomy::Bucket};
use serde::Serialize;

use crate::{
  ordinal::OrdinalScale,
  table::{Cell, PivotBuilder, RowKey, WideTable, concat},
};

/// Three-level column key. Absent levels are empty strings.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct ColumnKey {
  pub question:    String,
  pub subquestion: String,
  pub option:      String,
}

impl ColumnKey {
  pub fn new(
    question: impl Into<String>,
    subquestion: impl Into<String>,
    option: impl Into<String>,
  ) -> Self {
    Self {
      question:    question.into(),
      subquestion: subquestion.into(),
      option:      option.into(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
  SingleSelect,
  MultiSelect,
  Value,
}

/// The block a row belongs to, or `None` for rows that never produce
/// columns.
fn block(record: &LongRecord) -> Option<Block> {
  let bucket = match record.question_type.bucket() {
    Bucket::TwoLayer => record.subquestion_type?.bucket(),
    other => other,
  };
  match bucket {
    Bucket::SingleSelect => Some(Block::SingleSelect),
    Bucket::MultiSelect => Some(Block::MultiSelect),
    Bucket::SingleValue | Bucket::MultiValue | Bucket::Hidden => {
      Some(Block::Value)
    }
    Bucket::TwoLayer | Bucket::Unsupported | Bucket::Structural => None,
  }
}

/// Read a presence flag. Anything unrecognised is missing.
fn presence(answer: Option<&str>) -> Cell {
  match answer.map(str::trim) {
    Some("1" | "true" | "True" | "TRUE") => Cell::Flag(true),
    Some("0" | "false" | "False" | "FALSE") => Cell::Flag(false),
    _ => Cell::Missing,
  }
}

type ScaleKey = (String, String);

/// Build one ordinal scale per `(question, subquestion)`.
///
/// Declared labels come first, in declaration order. Observed labels missing
/// from the declaration follow in ascending `option_order`.
fn scales<'a>(
  records: impl IntoIterator<Item = &'a LongRecord>,
) -> BTreeMap<ScaleKey, Arc<OrdinalScale>> {
  let mut declared: BTreeMap<ScaleKey, &'a [String]> = BTreeMap::new();
  let mut seen: BTreeMap<ScaleKey, BTreeSet<(i64, &'a str)>> = BTreeMap::new();
  for r in records {
    if let Some(option) = r.option.as_deref() {
      let key = scale_key(r);
      if !r.option_labels.is_empty() {
        declared.entry(key.clone()).or_insert(&r.option_labels);
      }
      seen
        .entry(key)
        .or_default()
        .insert((r.option_order.unwrap_or(i64::MAX), option));
    }
  }

  seen
    .into_iter()
    .map(|(key, observed)| {
      let labels = declared
        .get(&key)
        .copied()
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .chain(observed.into_iter().map(|(_, l)| l))
        .map(str::to_owned);
      (key, Arc::new(OrdinalScale::new(labels)))
    })
    .collect()
}

fn scale_key(r: &LongRecord) -> ScaleKey {
  (r.question.clone(), r.subquestion.clone().unwrap_or_default())
}

pub fn multi_table<'a>(
  records: impl IntoIterator<Item = &'a LongRecord>,
) -> WideTable<ColumnKey> {
  let mut single = Vec::new();
  let mut multi = Vec::new();
  let mut value = Vec::new();
  let mut skipped = 0usize;

  for r in records {
    match block(r) {
      Some(Block::SingleSelect) => single.push(r),
      Some(Block::MultiSelect) => multi.push(r),
      Some(Block::Value) => value.push(r),
      None => skipped += 1,
    }
  }
  if skipped != 0 {
    tracing::debug!(skipped, "multi pivot skipped rows with no column");
  }

  // ── Single-select ─────────────────────────────────────────────────────
  let scales = scales(single.iter().copied());
  let mut single_pivot = PivotBuilder::new();
  for r in single {
    let Some(scale) = scales.get(&scale_key(r)) else {
      continue;
    };
    single_pivot.insert(
      RowKey::new(r.survey_id, r.response_id),
      ColumnKey::new(&r.question, r.subquestion.clone().unwrap_or_default(), ""),
      Cell::Category(scale.value(r.option.as_deref())),
    );
  }

  // ── Multi-select ──────────────────────────────────────────────────────
  let mut multi_pivot = PivotBuilder::new();
  for r in multi {
    multi_pivot.insert(
      RowKey::new(r.survey_id, r.response_id),
      column(r),
      presence(r.answer.as_deref()),
    );
  }

  // ── Values ────────────────────────────────────────────────────────────
  let mut value_pivot = PivotBuilder::new();
  for r in value {
    value_pivot.insert(
      RowKey::new(r.survey_id, r.response_id),
      column(r),
      Cell::from(r.answer.clone()),
    );
  }

  let dropped = single_pivot.duplicates()
    + multi_pivot.duplicates()
    + value_pivot.duplicates();
  if dropped != 0 {
    tracing::debug!(dropped, "multi pivot dropped rows for occupied cells");
  }

  concat(vec![
    single_pivot.finish(),
    multi_pivot.finish(),
    value_pivot.finish(),
  ])
}

fn column(r: &LongRecord) -> ColumnKey {
  ColumnKey::new(
    &r.question,
    r.subquestion.clone().unwrap_or_default(),
    r.option.clone().unwrap_or_default(),
  )
}
