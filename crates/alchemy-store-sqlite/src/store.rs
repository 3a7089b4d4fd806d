//! [`SqliteStore`] — the SQLite implementation of [`SurveyStore`].

use std::path::Path;

use alchemy_core::{
  model::{LongRecord, SurveyBatch, SurveyFilter},
  store::{EntityCounts, IngestSummary, SurveyStore},
};
use rusqlite::{CachedStatement, Params, Transaction, params};

use crate::{
  Result,
  encode::{OptionLabels, RawLongRecord},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An answer store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Batch writer ────────────────────────────────────────────────────────────

/// Write one survey's batch inside `tx`.
///
/// Metadata statements propagate their errors so the caller rolls back.
/// Answer inserts are the one exception: a failing row is logged and counted.
fn write_batch(tx: &Transaction<'_>, batch: &SurveyBatch) -> Result<IngestSummary> {
  let mut summary = IngestSummary::default();
  let survey = &batch.survey;

  // ── Survey ────────────────────────────────────────────────────────────
  {
    let mut retitle = tx.prepare_cached(
      "UPDATE survey SET title = ?2 WHERE id = ?1 AND title != ?2",
    )?;
    summary.drift_corrections += heal(
      &mut retitle,
      params![survey.id, survey.title],
      "survey",
      "title",
      survey.id,
    )?;

    summary.surveys_inserted += tx.execute(
      "INSERT OR IGNORE INTO survey (id, title) VALUES (?1, ?2)",
      params![survey.id, survey.title],
    )?;
  }

  // ── Questions ─────────────────────────────────────────────────────────
  {
    let mut retitle = tx.prepare_cached(
      "UPDATE question SET title = ?3
        WHERE survey_id = ?1 AND id = ?2 AND title != ?3",
    )?;
    let mut rename = tx.prepare_cached(
      "UPDATE question SET shortname = ?3
        WHERE survey_id = ?1 AND id = ?2 AND shortname IS NOT ?3",
    )?;
    let mut insert = tx.prepare_cached(
      "INSERT OR IGNORE INTO question (
         survey_id, id, parent_id, title, shortname, base_type, question_type
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for q in &batch.questions {
      summary.drift_corrections += heal(
        &mut retitle,
        params![q.survey_id, q.id, q.title],
        "question",
        "title",
        q.id,
      )?;
      // A payload without a shortname never overwrites a stored one.
      if let Some(shortname) = &q.shortname {
        summary.drift_corrections += heal(
          &mut rename,
          params![q.survey_id, q.id, shortname],
          "question",
          "shortname",
          q.id,
        )?;
      }
      summary.questions_inserted += insert.execute(params![
        q.survey_id,
        q.id,
        q.parent_id,
        q.title,
        q.shortname,
        q.base_type.code(),
        q.question_type.code(),
      ])?;
    }
  }

  // ── Options ───────────────────────────────────────────────────────────
  {
    let mut relabel = tx.prepare_cached(
      "UPDATE option SET value = ?3
        WHERE survey_id = ?1 AND id = ?2 AND value != ?3",
    )?;
    let mut insert = tx.prepare_cached(
      "INSERT OR IGNORE INTO option (survey_id, id, question_id, value, option_order)
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for o in &batch.options {
      summary.drift_corrections += heal(
        &mut relabel,
        params![o.survey_id, o.id, o.value],
        "option",
        "value",
        o.id,
      )?;
      summary.options_inserted += insert.execute(params![
        o.survey_id,
        o.id,
        o.question_id,
        o.value,
        o.option_order,
      ])?;
    }
  }

  // ── Responses ─────────────────────────────────────────────────────────
  {
    let mut insert = tx.prepare_cached(
      "INSERT OR IGNORE INTO response (survey_id, id) VALUES (?1, ?2)",
    )?;
    // A re-ingested response replaces its earlier answers.
    let mut clear = tx.prepare_cached(
      "DELETE FROM answer WHERE survey_id = ?1 AND response_id = ?2",
    )?;

    for r in &batch.responses {
      summary.responses_inserted += insert.execute(params![r.survey_id, r.id])?;
      summary.answers_replaced += clear.execute(params![r.survey_id, r.id])?;
    }
  }

  // ── Answers ───────────────────────────────────────────────────────────
  {
    let mut insert = tx.prepare_cached(
      "INSERT INTO answer (
         survey_id, response_id, question_id, sub_question_id, option_id, answer
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for a in &batch.answers {
      match insert.execute(params![
        a.survey_id,
        a.response_id,
        a.question_id,
        a.sub_question_id,
        a.option_id,
        a.answer,
      ]) {
        Ok(n) => summary.answers_inserted += n,
        Err(error) => {
          summary.answers_failed += 1;
          tracing::warn!(
            survey_id = a.survey_id,
            response_id = a.response_id,
            question_id = a.question_id,
            sub_question_id = a.sub_question_id,
            option_id = a.option_id,
            %error,
            "failed to insert answer; skipping"
          );
        }
      }
    }
  }

  Ok(summary)
}

/// Run a drift-correcting `UPDATE` and warn for every row it touched.
fn heal(
  stmt: &mut CachedStatement<'_>,
  params: impl Params,
  entity: &'static str,
  field: &'static str,
  id: i64,
) -> Result<usize> {
  let corrected = stmt.execute(params)?;
  if corrected != 0 {
    tracing::warn!(
      entity,
      field,
      id,
      "stored {entity} {field} differed from the incoming payload; corrected in place"
    );
  }
  Ok(corrected)
}

// ─── SurveyStore impl ────────────────────────────────────────────────────────

impl SurveyStore for SqliteStore {
  type Error = crate::Error;

  async fn ingest(&self, batch: SurveyBatch) -> Result<IngestSummary> {
    let survey_id = batch.survey.id;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match write_batch(&tx, &batch) {
          Ok(summary) => {
            tx.commit()?;
            Ok(Ok(summary))
          }
          Err(error) => {
            tx.rollback()?;
            Ok(Err(error))
          }
        }
      })
      .await?;

    match &outcome {
      Ok(summary) => tracing::debug!(survey_id, ?summary, "committed survey batch"),
      Err(error) => {
        tracing::debug!(survey_id, %error, "rolled back survey batch")
      }
    }
    outcome
  }

  async fn records(&self, filter: &SurveyFilter) -> Result<Vec<LongRecord>> {
    let ids: Vec<i64> = match filter {
      SurveyFilter::All => Vec::new(),
      SurveyFilter::Only(ids) if ids.is_empty() => return Ok(Vec::new()),
      SurveyFilter::Only(ids) => ids.iter().copied().collect(),
    };

    let (raws, labels): (Vec<RawLongRecord>, OptionLabels) = self
      .conn
      .call(move |conn| {
        let survey_filter = |column: &str| {
          if ids.is_empty() {
            String::new()
          } else {
            let placeholders = vec!["?"; ids.len()].join(", ");
            format!("WHERE {column} IN ({placeholders})")
          }
        };

        // The ORDER BY resolves the question name the same way as
        // `display_name`.
        let sql = format!(
          "SELECT
             a.survey_id,
             a.response_id,
             q1.shortname,
             q1.title,
             q2.title          AS subquestion,
             q2.question_type  AS subquestion_type,
             o.value           AS option,
             o.option_order,
             o.question_id     AS option_question_id,
             a.answer,
             q1.question_type
           FROM answer AS a
           INNER JOIN question AS q1
                   ON q1.survey_id = a.survey_id AND q1.id = a.question_id
           LEFT  JOIN question AS q2
                   ON q2.survey_id = a.survey_id AND q2.id = a.sub_question_id
           LEFT  JOIN option   AS o
                   ON o.survey_id  = a.survey_id AND o.id  = a.option_id
           {}
           ORDER BY a.survey_id, a.response_id,
                    COALESCE(NULLIF(q1.shortname, ''), q1.title), a.answer_id",
          survey_filter("a.survey_id"),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(ids.iter()),
            RawLongRecord::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let sql = format!(
          "SELECT survey_id, question_id, value FROM option
           {}
           ORDER BY survey_id, question_id, option_order",
          survey_filter("survey_id"),
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut labels = OptionLabels::new();
        let mut query = stmt.query(rusqlite::params_from_iter(ids.iter()))?;
        while let Some(row) = query.next()? {
          labels
            .entry((row.get(0)?, row.get(1)?))
            .or_default()
            .push(row.get(2)?);
        }

        Ok((rows, labels))
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| raw.into_record(&labels))
      .collect()
  }

  async fn counts(&self) -> Result<EntityCounts> {
    let counts = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM survey),
             (SELECT COUNT(*) FROM question),
             (SELECT COUNT(*) FROM option),
             (SELECT COUNT(*) FROM response),
             (SELECT COUNT(*) FROM answer)",
          [],
          |row| {
            Ok(EntityCounts {
              surveys:   row.get::<_, i64>(0)? as usize,
              questions: row.get::<_, i64>(1)? as usize,
              options:   row.get::<_, i64>(2)? as usize,
              responses: row.get::<_, i64>(3)? as usize,
              answers:   row.get::<_, i64>(4)? as usize,
            })
          },
        )?)
      })
      .await?;
    Ok(counts)
  }
}
