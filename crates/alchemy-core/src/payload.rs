//! Typed schemas for the survey platform's JSON payloads.
//!
//! Every node kind has its own struct with explicit optional fields. Unknown
//! fields are ignored; a field of the wrong shape is a deserialisation error,
//! so the walker in [`crate::flatten`] never has to guess.

use std::{fmt, marker::PhantomData};

use serde::{
  Deserialize, Deserializer,
  de::{self, MapAccess, SeqAccess, Visitor},
};

// ─── Envelopes ───────────────────────────────────────────────────────────────

/// `{"result_ok": true, "data": ...}` wrapper for single-object endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
  pub data: T,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
  #[serde(default = "first_page")]
  pub page:             u32,
  #[serde(default = "first_page")]
  pub total_pages:      u32,
  #[serde(default)]
  pub total_count:      Option<u64>,
  #[serde(default)]
  pub results_per_page: Option<u32>,
  #[serde(default = "Vec::new", deserialize_with = "map_or_seq")]
  pub data:             Vec<T>,
}

fn first_page() -> u32 { 1 }

// ─── Survey and questions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyPayload {
  #[serde(deserialize_with = "id")]
  pub id:    i64,
  pub title: String,
}

/// Localised text; only the English rendering is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedText {
  #[serde(rename = "English", default)]
  pub english: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionPayload {
  #[serde(deserialize_with = "id")]
  pub id:            i64,
  /// Question-type tag, e.g. `"RADIO"`.
  #[serde(rename = "type")]
  pub kind:          String,
  pub base_type:     String,
  #[serde(default)]
  pub shortname:     Option<String>,
  #[serde(default)]
  pub title:         LocalizedText,
  #[serde(default, deserialize_with = "map_or_seq")]
  pub sub_questions: Vec<QuestionPayload>,
  #[serde(default, deserialize_with = "map_or_seq")]
  pub options:       Vec<OptionPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionPayload {
  #[serde(deserialize_with = "id")]
  pub id:    i64,
  /// The option's reporting label.
  pub value: String,
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePayload {
  #[serde(deserialize_with = "id")]
  pub id:          i64,
  #[serde(default, deserialize_with = "map_or_seq")]
  pub survey_data: Vec<AnswerPayload>,
}

/// One answered question inside a response; also used for the sub-answers of
/// a two-layer question.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerPayload {
  #[serde(deserialize_with = "id")]
  pub id:            i64,
  /// Owning question when this answer belongs to a sub-question.
  #[serde(default, deserialize_with = "nonzero_id")]
  pub parent:        Option<i64>,
  #[serde(default)]
  pub answer:        Field,
  /// Selected option for single-select questions.
  #[serde(default, deserialize_with = "nonzero_id")]
  pub answer_id:     Option<i64>,
  #[serde(default, deserialize_with = "map_or_seq")]
  pub options:       Vec<OptionAnswerPayload>,
  #[serde(default, deserialize_with = "map_or_seq")]
  pub sub_questions: Vec<AnswerPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionAnswerPayload {
  #[serde(deserialize_with = "id")]
  pub id:     i64,
  #[serde(default)]
  pub answer: Field,
}

// ─── Field ───────────────────────────────────────────────────────────────────

/// An optional scalar that remembers whether the key was present at all.
///
/// Presence-flag policies test [`Field::is_present`] (a `null` counts as
/// present); value policies read [`Field::value`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field {
  #[default]
  Absent,
  Null,
  Value(String),
}

impl Field {
  pub fn is_present(&self) -> bool { !matches!(self, Self::Absent) }

  pub fn value(&self) -> Option<&str> {
    match self {
      Self::Value(v) => Some(v),
      _ => None,
    }
  }

  pub fn into_value(self) -> Option<String> {
    match self {
      Self::Value(v) => Some(v),
      _ => None,
    }
  }
}

impl<'de> Deserialize<'de> for Field {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    d.deserialize_any(FieldVisitor)
  }
}

struct FieldVisitor;

impl<'de> Visitor<'de> for FieldVisitor {
  type Value = Field;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a string, number, boolean or null")
  }

  fn visit_unit<E: de::Error>(self) -> Result<Field, E> { Ok(Field::Null) }

  fn visit_none<E: de::Error>(self) -> Result<Field, E> { Ok(Field::Null) }

  fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Field, D::Error> {
    d.deserialize_any(self)
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Field, E> {
    Ok(Field::Value(v.to_owned()))
  }

  fn visit_string<E: de::Error>(self, v: String) -> Result<Field, E> {
    Ok(Field::Value(v))
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Field, E> {
    Ok(Field::Value(v.to_string()))
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Field, E> {
    Ok(Field::Value(v.to_string()))
  }

  fn visit_f64<E: de::Error>(self, v: f64) -> Result<Field, E> {
    Ok(Field::Value(v.to_string()))
  }

  fn visit_bool<E: de::Error>(self, v: bool) -> Result<Field, E> {
    Ok(Field::Value(if v { "1" } else { "0" }.to_owned()))
  }
}

// ─── Identifier helpers ──────────────────────────────────────────────────────

/// Identifiers arrive as JSON integers or as numeric strings.
fn id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
  d.deserialize_any(IdVisitor)
}

/// An optional identifier where `null`, `""` and `0` all mean "none".
fn nonzero_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
  Ok(d.deserialize_any(OptionalIdVisitor)?.filter(|id| *id != 0))
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
  type Value = i64;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("an integer identifier")
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> { Ok(v) }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
    i64::try_from(v).map_err(|_| E::custom(format!("identifier {v} out of range")))
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
    v.trim()
      .parse()
      .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
  }
}

struct OptionalIdVisitor;

impl<'de> Visitor<'de> for OptionalIdVisitor {
  type Value = Option<i64>;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("an integer identifier or null")
  }

  fn visit_unit<E: de::Error>(self) -> Result<Option<i64>, E> { Ok(None) }

  fn visit_none<E: de::Error>(self) -> Result<Option<i64>, E> { Ok(None) }

  fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Option<i64>, D::Error> {
    d.deserialize_any(self)
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Option<i64>, E> {
    IdVisitor.visit_i64(v).map(Some)
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Option<i64>, E> {
    IdVisitor.visit_u64(v).map(Some)
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Option<i64>, E> {
    if v.trim().is_empty() {
      return Ok(None);
    }
    IdVisitor.visit_str(v).map(Some)
  }
}

// ─── Collection helper ───────────────────────────────────────────────────────

/// Accept a JSON array, a JSON object (values in document order) or `null`.
///
/// The platform serialises keyed collections as objects and empty ones as
/// `[]`, sometimes within the same payload.
fn map_or_seq<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  d.deserialize_any(MapOrSeqVisitor(PhantomData))
}

struct MapOrSeqVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for MapOrSeqVisitor<T> {
  type Value = Vec<T>;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("an array, an object or null")
  }

  fn visit_unit<E: de::Error>(self) -> Result<Vec<T>, E> { Ok(Vec::new()) }

  fn visit_none<E: de::Error>(self) -> Result<Vec<T>, E> { Ok(Vec::new()) }

  fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Vec<T>, D::Error> {
    d.deserialize_any(self)
  }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<T>, A::Error> {
    let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
    while let Some(item) = seq.next_element()? {
      out.push(item);
    }
    Ok(out)
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<T>, A::Error> {
    let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
    while let Some((_, item)) = map.next_entry::<de::IgnoredAny, T>()? {
      out.push(item);
    }
    Ok(out)
  }
}
