//! Wide tables: one row per `(survey_id, response_id)`, one cell per column.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::ordinal::OrdinalValue;

// ─── Rows and cells ──────────────────────────────────────────────────────────

/// The index of a wide table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct RowKey {
  pub survey_id:   i64,
  pub response_id: i64,
}

impl RowKey {
  pub fn new(survey_id: i64, response_id: i64) -> Self {
    Self { survey_id, response_id }
  }
}

/// One cell of a wide table.
///
/// Serializes as `null`, a string, a boolean, or the category label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
  #[default]
  Missing,
  Text(String),
  Flag(bool),
  Category(OrdinalValue),
}

impl Cell {
  /// `true` for [`Cell::Missing`] and for categories with no position on
  /// their scale.
  pub fn is_missing(&self) -> bool {
    match self {
      Self::Missing => true,
      Self::Category(v) => v.is_missing(),
      Self::Text(_) | Self::Flag(_) => false,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_flag(&self) -> Option<bool> {
    match self {
      Self::Flag(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_category(&self) -> Option<&OrdinalValue> {
    match self {
      Self::Category(v) => Some(v),
      _ => None,
    }
  }
}

impl From<Option<String>> for Cell {
  fn from(value: Option<String>) -> Self {
    value.map_or(Self::Missing, Self::Text)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow {
  pub key:   RowKey,
  pub cells: Vec<Cell>,
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// A pivoted table with column keys of type `K`.
///
/// Rows are sorted by [`RowKey`]; every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideTable<K> {
  columns: Vec<K>,
  rows:    Vec<WideRow>,
}

impl<K> Default for WideTable<K> {
  fn default() -> Self { Self { columns: Vec::new(), rows: Vec::new() } }
}

impl<K: PartialEq> WideTable<K> {
  pub fn columns(&self) -> &[K] { &self.columns }

  pub fn rows(&self) -> &[WideRow] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn column_index(&self, column: &K) -> Option<usize> {
    self.columns.iter().position(|c| c == column)
  }

  pub fn row(&self, key: RowKey) -> Option<&WideRow> {
    self
      .rows
      .binary_search_by(|r| r.key.cmp(&key))
      .ok()
      .map(|i| &self.rows[i])
  }

  /// The cell at `(key, column)`, or `None` when either is absent.
  pub fn get(&self, key: RowKey, column: &K) -> Option<&Cell> {
    let col = self.column_index(column)?;
    self.row(key).map(|r| &r.cells[col])
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Accumulates cells for one pivot. The first value written to a
/// `(row, column)` slot wins.
pub(crate) struct PivotBuilder<K> {
  rows:       BTreeMap<RowKey, BTreeMap<K, Cell>>,
  columns:    BTreeSet<K>,
  duplicates: usize,
}

impl<K: Ord + Clone> PivotBuilder<K> {
  pub(crate) fn new() -> Self {
    Self {
      rows:       BTreeMap::new(),
      columns:    BTreeSet::new(),
      duplicates: 0,
    }
  }

  /// Returns `false` when the slot was already filled.
  pub(crate) fn insert(&mut self, key: RowKey, column: K, cell: Cell) -> bool {
    let row = self.rows.entry(key).or_default();
    if row.contains_key(&column) {
      self.duplicates += 1;
      return false;
    }
    self.columns.insert(column.clone());
    row.insert(column, cell);
    true
  }

  pub(crate) fn duplicates(&self) -> usize { self.duplicates }

  pub(crate) fn finish(self) -> WideTable<K> {
    let columns: Vec<K> = self.columns.into_iter().collect();
    let rows = self
      .rows
      .into_iter()
      .map(|(key, mut cells)| WideRow {
        key,
        cells: columns
          .iter()
          .map(|c| cells.remove(c).unwrap_or_default())
          .collect(),
      })
      .collect();
    WideTable { columns, rows }
  }
}

/// Concatenate tables column-wise, aligned on the union of their row keys.
///
/// A row absent from one block gets missing cells for that block's columns.
pub(crate) fn concat<K>(blocks: Vec<WideTable<K>>) -> WideTable<K> {
  let keys: BTreeSet<RowKey> = blocks
    .iter()
    .flat_map(|b| b.rows.iter().map(|r| r.key))
    .collect();

  let mut columns = Vec::new();
  let mut cells: HashMap<RowKey, Vec<Cell>> =
    keys.iter().map(|k| (*k, Vec::new())).collect();

  for block in blocks {
    let width = block.columns.len();
    let mut by_key: HashMap<RowKey, Vec<Cell>> =
      block.rows.into_iter().map(|r| (r.key, r.cells)).collect();

    for (key, out) in cells.iter_mut() {
      match by_key.remove(key) {
        Some(row) => out.extend(row),
        None => out.extend(std::iter::repeat_n(Cell::Missing, width)),
      }
    }
    columns.extend(block.columns);
  }

  let rows = keys
    .into_iter()
    .map(|key| WideRow {
      key,
      cells: cells.remove(&key).unwrap_or_default(),
    })
    .collect();
  WideTable { columns, rows }
}
