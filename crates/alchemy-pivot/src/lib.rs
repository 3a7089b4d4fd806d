//! Pivot reshaper: long-format answer rows in, analysis-ready wide tables
//! out.
//!
//! Two layouts are supported:
//!
//! - [`ColumnMode::Flat`] — one column per variable name, derived from the
//!   question taxonomy (see [`flat`]).
//! - [`ColumnMode::Multi`] — three typed blocks keyed by
//!   `(question, subquestion, option)` (see [`multi`]).
//!
//! Reshaping is pure and holds no shared state; it works on a fully
//! materialised long table.

pub mod flat;
pub mod multi;
pub mod ordinal;
pub mod table;

use alchemy_core::model::{LongRecord, SurveyFilter};
use serde::{Deserialize, Serialize};

pub use multi::ColumnKey;
pub use ordinal::{OrdinalScale, OrdinalValue};
pub use table::{Cell, RowKey, WideRow, WideTable};

/// Output layout for [`reshape`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMode {
  #[default]
  Flat,
  Multi,
}

/// A reshaped table in one of the two layouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Table {
  Flat(WideTable<String>),
  Multi(WideTable<ColumnKey>),
}

impl Table {
  pub fn rows(&self) -> &[WideRow] {
    match self {
      Self::Flat(t) => t.rows(),
      Self::Multi(t) => t.rows(),
    }
  }
}

/// Reshape the rows of `records` whose survey passes `filter`.
pub fn reshape(
  records: &[LongRecord],
  filter: &SurveyFilter,
  mode: ColumnMode,
) -> Table {
  let selected = records.iter().filter(|r| filter.matches(r.survey_id));
  match mode {
    ColumnMode::Flat => Table::Flat(flat::flat_table(selected)),
    ColumnMode::Multi => Table::Multi(multi::multi_table(selected)),
  }
}
