//! Flat mode: one column per variable name.
//!
//! Names are derived per row from the question's bucket (see
//! [`alchemy_core::naming::variable_name`]). When two rows of the same
//! response resolve to the same name, the first row encountered keeps the
//! slot and later ones are dropped.

use alchemy_core::{model::LongRecord, naming::variable_name};

use crate::table::{Cell, PivotBuilder, RowKey, WideTable};

pub fn flat_table<'a>(
  records: impl IntoIterator<Item = &'a LongRecord>,
) -> WideTable<String> {
  let mut pivot = PivotBuilder::new();
  let mut skipped = 0usize;

  for record in records {
    let Some(name) = variable_name(
      record.question_type.bucket(),
      &record.question,
      record.subquestion.as_deref(),
      record.option.as_deref(),
    ) else {
      skipped += 1;
      continue;
    };

    pivot.insert(
      RowKey::new(record.survey_id, record.response_id),
      name,
      Cell::from(record.answer.clone()),
    );
  }

  if pivot.duplicates() != 0 {
    tracing::debug!(
      dropped = pivot.duplicates(),
      "flat pivot dropped rows whose variable name was already taken"
    );
  }
  if skipped != 0 {
    tracing::debug!(skipped, "flat pivot skipped rows with no variable name");
  }

  pivot.finish()
}
