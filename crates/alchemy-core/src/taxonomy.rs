//! The question taxonomy — a closed classification of the survey platform's
//! question kinds into behavioral buckets.
//!
//! Both the flattener and the reshaper branch on [`Bucket`], never on the raw
//! [`QuestionType`], so adding a question kind means deciding its bucket here
//! and nowhere else.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

// ─── QuestionType ────────────────────────────────────────────────────────────

/// A question kind as tagged by the survey platform (`type` field).
///
/// The discriminant is the integer code stored in the `question_type` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumIter,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum QuestionType {
  Hidden       = 0,
  Instructions = 1,
  Javascript   = 2,
  #[strum(to_string = "URLREDIRECT")]
  #[serde(rename = "URLREDIRECT")]
  UrlRedirect  = 3,
  Logic        = 4,
  Media        = 5,
  Radio        = 6,
  Menu         = 7,
  Slider       = 8,
  Textbox      = 9,
  Essay        = 10,
  Checkbox     = 11,
  Rank         = 12,
  MultiTextbox = 13,
  MultiSlider  = 14,
  Group        = 15,
  Video        = 16,
  Table        = 17,
  Matrix       = 18,
}

impl QuestionType {
  /// Parse the platform's tag, e.g. `"RADIO"` or `"MULTI_TEXTBOX"`.
  pub fn from_tag(tag: &str) -> Result<Self> {
    tag
      .parse()
      .map_err(|_| Error::UnknownQuestionType(tag.to_owned()))
  }

  /// The integer stored in the database.
  pub fn code(self) -> i64 { self as u8 as i64 }

  pub fn from_code(code: i64) -> Result<Self> {
    Ok(match code {
      0 => Self::Hidden,
      1 => Self::Instructions,
      2 => Self::Javascript,
      3 => Self::UrlRedirect,
      4 => Self::Logic,
      5 => Self::Media,
      6 => Self::Radio,
      7 => Self::Menu,
      8 => Self::Slider,
      9 => Self::Textbox,
      10 => Self::Essay,
      11 => Self::Checkbox,
      12 => Self::Rank,
      13 => Self::MultiTextbox,
      14 => Self::MultiSlider,
      15 => Self::Group,
      16 => Self::Video,
      17 => Self::Table,
      18 => Self::Matrix,
      other => return Err(Error::UnknownQuestionTypeCode(other)),
    })
  }

  pub fn bucket(self) -> Bucket {
    match self {
      Self::Hidden => Bucket::Hidden,
      Self::Radio | Self::Menu => Bucket::SingleSelect,
      Self::Slider | Self::Textbox | Self::Essay => Bucket::SingleValue,
      Self::Checkbox => Bucket::MultiSelect,
      Self::Rank | Self::MultiSlider | Self::MultiTextbox | Self::Video => {
        Bucket::MultiValue
      }
      Self::Table | Self::Matrix => Bucket::TwoLayer,
      Self::Instructions
      | Self::Javascript
      | Self::UrlRedirect
      | Self::Logic => Bucket::Unsupported,
      Self::Media | Self::Group => Bucket::Structural,
    }
  }
}

// ─── BaseType ────────────────────────────────────────────────────────────────

/// The platform's coarse `base_type` tag.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  EnumString,
  Serialize,
  Deserialize,
)]
#[repr(u8)]
pub enum BaseType {
  Action     = 1,
  Question   = 2,
  Decorative = 3,
}

impl BaseType {
  pub fn from_tag(tag: &str) -> Result<Self> {
    tag
      .parse()
      .map_err(|_| Error::UnknownBaseType(tag.to_owned()))
  }

  pub fn code(self) -> i64 { self as u8 as i64 }

  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      1 => Ok(Self::Action),
      2 => Ok(Self::Question),
      3 => Ok(Self::Decorative),
      other => Err(Error::UnknownBaseTypeCode(other)),
    }
  }
}

// ─── Bucket ──────────────────────────────────────────────────────────────────

/// Behavioral grouping of question kinds that share answer-emission and
/// reshape rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
  /// A single scalar stored as metadata; no options.
  Hidden,
  /// One answer chosen from a fixed option set.
  SingleSelect,
  /// One scalar answer, no options.
  SingleValue,
  /// An independent boolean per option.
  MultiSelect,
  /// One scalar answer per option.
  MultiValue,
  /// A grid of sub-questions, each with its own bucket.
  TwoLayer,
  /// Non-data-bearing kinds; answering one is fatal.
  Unsupported,
  /// Layout containers that never carry answers.
  Structural,
}

impl Bucket {
  /// Buckets whose flat-mode column is named after the question alone.
  pub fn is_singleton(self) -> bool {
    matches!(self, Self::Hidden | Self::SingleSelect | Self::SingleValue)
  }

  /// Buckets whose flat-mode columns are named per option.
  pub fn is_multi(self) -> bool {
    matches!(self, Self::MultiSelect | Self::MultiValue)
  }

  /// The four policies a two-layer sub-question may follow.
  pub fn is_leaf(self) -> bool { self.leaf().is_some() }

  pub fn leaf(self) -> Option<LeafPolicy> {
    match self {
      Self::SingleSelect => Some(LeafPolicy::SingleSelect),
      Self::SingleValue => Some(LeafPolicy::SingleValue),
      Self::MultiSelect => Some(LeafPolicy::MultiSelect),
      Self::MultiValue => Some(LeafPolicy::MultiValue),
      Self::Hidden
      | Self::TwoLayer
      | Self::Unsupported
      | Self::Structural => None,
    }
  }
}

/// Answer-emission policy for a bucket that holds answers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafPolicy {
  SingleSelect,
  SingleValue,
  MultiSelect,
  MultiValue,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn tags_parse_to_their_variants() {
    assert_eq!(QuestionType::from_tag("RADIO").unwrap(), QuestionType::Radio);
    assert_eq!(
      QuestionType::from_tag("MULTI_TEXTBOX").unwrap(),
      QuestionType::MultiTextbox
    );
    assert_eq!(
      QuestionType::from_tag("URLREDIRECT").unwrap(),
      QuestionType::UrlRedirect
    );
    assert_eq!(BaseType::from_tag("Decorative").unwrap(), BaseType::Decorative);
  }

  #[test]
  fn unknown_tags_are_rejected() {
    assert!(matches!(
      QuestionType::from_tag("radio"),
      Err(Error::UnknownQuestionType(t)) if t == "radio"
    ));
    assert!(matches!(
      QuestionType::from_tag("NPS"),
      Err(Error::UnknownQuestionType(_))
    ));
    assert!(matches!(
      BaseType::from_tag("question"),
      Err(Error::UnknownBaseType(_))
    ));
  }

  #[test]
  fn display_matches_the_platform_tag() {
    for qt in QuestionType::iter() {
      assert_eq!(QuestionType::from_tag(&qt.to_string()).unwrap(), qt);
    }
  }

  #[test]
  fn codes_are_stable() {
    for qt in QuestionType::iter() {
      assert_eq!(QuestionType::from_code(qt.code()).unwrap(), qt);
    }
    for bt in BaseType::iter() {
      assert_eq!(BaseType::from_code(bt.code()).unwrap(), bt);
    }
    assert_eq!(QuestionType::Matrix.code(), 18);
    assert_eq!(BaseType::Action.code(), 1);
    assert!(QuestionType::from_code(19).is_err());
    assert!(BaseType::from_code(0).is_err());
  }

  #[test]
  fn buckets_partition_the_taxonomy() {
    use QuestionType::*;
    let expect = [
      (Hidden, Bucket::Hidden),
      (Radio, Bucket::SingleSelect),
      (Menu, Bucket::SingleSelect),
      (Slider, Bucket::SingleValue),
      (Textbox, Bucket::SingleValue),
      (Essay, Bucket::SingleValue),
      (Checkbox, Bucket::MultiSelect),
      (Rank, Bucket::MultiValue),
      (MultiSlider, Bucket::MultiValue),
      (MultiTextbox, Bucket::MultiValue),
      (Video, Bucket::MultiValue),
      (Table, Bucket::TwoLayer),
      (Matrix, Bucket::TwoLayer),
      (Instructions, Bucket::Unsupported),
      (Javascript, Bucket::Unsupported),
      (UrlRedirect, Bucket::Unsupported),
      (Logic, Bucket::Unsupported),
    ];
    for (qt, bucket) in expect {
      assert_eq!(qt.bucket(), bucket, "{qt}");
    }
    assert!(Hidden.bucket().is_singleton());
    assert!(!Checkbox.bucket().is_singleton());
    assert!(Video.bucket().is_multi());
    assert!(!Table.bucket().is_leaf());
  }
}
