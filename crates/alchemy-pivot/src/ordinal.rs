//! Ordered categorical values for single-select answers.
//!
//! A scale is the list of a question's option labels in declaration order. A value
//! compares by its position in that list, and only against values on an
//! equal scale; everything else is unordered.

use std::{cmp::Ordering, sync::Arc};

use serde::{Serialize, Serializer};

// ─── Scale ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrdinalScale {
  labels: Vec<String>,
}

impl OrdinalScale {
  /// Build a scale from labels already in ascending order. Repeated labels
  /// keep their first position.
  pub fn new(labels: impl IntoIterator<Item = String>) -> Self {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
      if !out.contains(&label) {
        out.push(label);
      }
    }
    Self { labels: out }
  }

  pub fn labels(&self) -> &[String] { &self.labels }

  pub fn position(&self, label: &str) -> Option<usize> {
    self.labels.iter().position(|l| l == label)
  }

  /// Encode `label` on this scale. Labels outside the scale, and `None`,
  /// become missing values.
  pub fn value(self: &Arc<Self>, label: Option<&str>) -> OrdinalValue {
    OrdinalValue {
      scale: Arc::clone(self),
      code:  label.and_then(|l| self.position(l)),
    }
  }
}

// ─── Value ───────────────────────────────────────────────────────────────────

/// A position on an [`OrdinalScale`], or a missing value.
///
/// Equality and ordering behave like floating-point `NaN` for missing
/// values: a missing value is neither equal to nor ordered against anything.
#[derive(Debug, Clone)]
pub struct OrdinalValue {
  scale: Arc<OrdinalScale>,
  code:  Option<usize>,
}

impl OrdinalValue {
  pub fn scale(&self) -> &OrdinalScale { &self.scale }

  pub fn code(&self) -> Option<usize> { self.code }

  pub fn is_missing(&self) -> bool { self.code.is_none() }

  pub fn label(&self) -> Option<&str> {
    self.code.map(|c| self.scale.labels[c].as_str())
  }

  fn same_scale(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.scale, &other.scale) || self.scale == other.scale
  }
}

impl PartialEq for OrdinalValue {
  fn eq(&self, other: &Self) -> bool {
    self.partial_cmp(other) == Some(Ordering::Equal)
  }
}

impl PartialOrd for OrdinalValue {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    if !self.same_scale(other) {
      return None;
    }
    match (self.code, other.code) {
      (Some(a), Some(b)) => Some(a.cmp(&b)),
      _ => None,
    }
  }
}

impl Serialize for OrdinalValue {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    match self.label() {
      Some(label) => s.serialize_str(label),
      None => s.serialize_none(),
    }
  }
}
