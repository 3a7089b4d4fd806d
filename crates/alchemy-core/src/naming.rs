//! Name resolver: turns free-text labels into safe column identifiers.

use crate::taxonomy::Bucket;

/// Canonicalise a label into a column-safe identifier.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`. One leading `X` is
/// then stripped, together with the `_` that directly follows it, which
/// undoes a guard prefix written by an earlier export. A genuine leading `X`
/// is stripped too (`"X-ray"` → `"ray"`). Finally an `X` is prepended if the
/// result starts with a digit (`"5-star!"` → `"X5_star_"`).
pub fn sanitize(label: &str) -> String {
  let replaced: String = label
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
    .collect();

  let stripped = match replaced.strip_prefix('X') {
    Some(rest) => rest.strip_prefix('_').unwrap_or(rest),
    None => &replaced,
  };

  guard_leading_digit(stripped)
}

/// Prepend `X` when `name` starts with an ASCII digit.
pub fn guard_leading_digit(name: &str) -> String {
  if name.starts_with(|c: char| c.is_ascii_digit()) {
    format!("X{name}")
  } else {
    name.to_owned()
  }
}

/// The name a question is known by: its shortname, or its title when the
/// shortname is missing or empty.
pub fn display_name(shortname: Option<&str>, title: &str) -> String {
  match shortname {
    Some(s) if !s.is_empty() => s.to_owned(),
    _ => title.to_owned(),
  }
}

/// The flat-mode column name for one long-format row.
///
/// Returns `None` for buckets that never produce columns.
pub fn variable_name(
  bucket: Bucket,
  question: &str,
  subquestion: Option<&str>,
  option: Option<&str>,
) -> Option<String> {
  match bucket {
    b if b.is_singleton() => Some(guard_leading_digit(question)),
    b if b.is_multi() => Some(format!(
      "{}_{}",
      sanitize(option.unwrap_or_default()),
      sanitize(question)
    )),
    Bucket::TwoLayer => Some(format!(
      "{}_{}",
      sanitize(subquestion.unwrap_or_default()),
      sanitize(question)
    )),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digits_get_a_guard_prefix() {
    assert_eq!(sanitize("5-star!"), "X5_star_");
  }

  #[test]
  fn leading_x_is_stripped_even_when_genuine() {
    assert_eq!(sanitize("X-ray"), "ray");
    assert_eq!(sanitize("Xylophone"), "ylophone");
    assert_eq!(sanitize("X5 stars"), "X5_stars");
  }

  #[test]
  fn only_one_leading_x_is_stripped() {
    assert_eq!(sanitize("XXL"), "XL");
  }

  #[test]
  fn non_alphanumerics_become_underscores() {
    assert_eq!(sanitize("Very satisfied (5)"), "Very_satisfied__5_");
    assert_eq!(sanitize("café"), "caf_");
    assert_eq!(sanitize(""), "");
  }

  #[test]
  fn display_name_falls_back_to_title() {
    assert_eq!(display_name(Some("age"), "How old are you?"), "age");
    assert_eq!(display_name(Some(""), "How old are you?"), "How old are you?");
    assert_eq!(display_name(None, "How old are you?"), "How old are you?");
  }

  #[test]
  fn variable_names_follow_the_bucket() {
    assert_eq!(
      variable_name(Bucket::SingleSelect, "q1 color", None, Some("Red")),
      Some("q1 color".into())
    );
    assert_eq!(
      variable_name(Bucket::Hidden, "2024 wave", None, None),
      Some("X2024 wave".into())
    );
    assert_eq!(
      variable_name(Bucket::MultiSelect, "fruit", None, Some("Kiwi & Lime")),
      Some("Kiwi___Lime_fruit".into())
    );
    assert_eq!(
      variable_name(Bucket::TwoLayer, "grid", Some("Row 1"), Some("Agree")),
      Some("Row_1_grid".into())
    );
    assert_eq!(variable_name(Bucket::Unsupported, "js", None, None), None);
  }
}
