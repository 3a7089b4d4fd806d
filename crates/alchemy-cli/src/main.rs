//! `alchemy` — load survey responses into a local answer store and reshape
//! them into wide tables.
//!
//! # Usage
//!
//! ```
//! ALCHEMY_API_KEY=... ALCHEMY_API_SECRET=... alchemy load 7982666 8002909
//! alchemy table --survey 7982666 --mode multi > wide.json
//! ```

use std::{
  fs::OpenOptions,
  io::{self, Write},
  path::{Path, PathBuf},
  sync::Mutex,
};

use alchemy_cli::{client::ApiClient, ingest_survey, settings::Settings};
use alchemy_core::{model::SurveyFilter, store::SurveyStore};
use alchemy_pivot::{ColumnMode, reshape};
use alchemy_store_sqlite::SqliteStore;
use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, filter::Targets, prelude::*};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "alchemy", author, version, about = "Survey response loader and reshaper")]
struct Cli {
  /// Path to a TOML config file (api_key, api_secret, store_path, ...).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Override the store path from the config.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Also write debug-level logs to this file.
  #[arg(long, value_name = "FILE", env = "ALCHEMY_LOG_FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch surveys from the platform and load them into the store.
  Load {
    /// Survey identifiers, processed one after another.
    #[arg(required = true, value_name = "SURVEY_ID")]
    survey_ids: Vec<i64>,
  },
  /// Print the stored answers as a wide JSON table.
  Table {
    /// Restrict to these surveys (repeatable). All surveys by default.
    #[arg(long = "survey", value_name = "SURVEY_ID")]
    surveys: Vec<i64>,

    #[arg(long, value_enum, default_value_t = Mode::Flat)]
    mode: Mode,
  },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
  Flat,
  Multi,
}

impl From<Mode> for ColumnMode {
  fn from(mode: Mode) -> Self {
    match mode {
      Mode::Flat => ColumnMode::Flat,
      Mode::Multi => ColumnMode::Multi,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.log_file.as_deref())?;

  let mut settings =
    Settings::load(cli.config.as_deref()).context("failed to load settings")?;
  if let Some(store) = cli.store {
    settings.store_path = store;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {}", settings.store_path.display())
    })?;

  match cli.command {
    Command::Load { survey_ids } => load(&settings, &store, &survey_ids).await,
    Command::Table { surveys, mode } => {
      table(&store, SurveyFilter::from(surveys), mode.into()).await
    }
  }
}

/// Console output at `RUST_LOG` (default INFO) on stderr, plus an optional
/// debug-level file for this workspace's crates.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
  let console = tracing_subscriber::fmt::layer()
    .with_writer(io::stderr)
    .with_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    );

  let file = match log_file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
      let targets = Targets::new()
        .with_default(LevelFilter::INFO)
        .with_target("alchemy", LevelFilter::DEBUG);
      Some(
        tracing_subscriber::fmt::layer()
          .with_ansi(false)
          .with_writer(Mutex::new(file))
          .with_filter(targets),
      )
    }
    None => None,
  };

  tracing_subscriber::registry().with(console).with(file).init();
  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn load(
  settings: &Settings,
  store: &SqliteStore,
  survey_ids: &[i64],
) -> anyhow::Result<()> {
  let client =
    ApiClient::new(settings.api()).context("failed to set up the API client")?;

  let mut failed = Vec::new();
  for &survey_id in survey_ids {
    match ingest_survey(&client, store, survey_id).await {
      Ok(report) => tracing::info!(
        survey_id,
        responses = report.responses,
        potential_answers = report.potential_answers,
        null_answers = report.null_answers,
        answers = report.summary.answers_inserted,
        "survey loaded"
      ),
      Err(error) => {
        let error = anyhow::Error::new(error);
        tracing::error!(survey_id, "{error:#}");
        tracing::info!(
          survey_id,
          "all data for survey {survey_id} from this run has been rolled back"
        );
        failed.push(survey_id);
      }
    }
  }

  if !failed.is_empty() {
    bail!(
      "{} of {} surveys failed to load: {failed:?}",
      failed.len(),
      survey_ids.len()
    );
  }
  Ok(())
}

async fn table(
  store: &SqliteStore,
  filter: SurveyFilter,
  mode: ColumnMode,
) -> anyhow::Result<()> {
  let records = store
    .records(&filter)
    .await
    .context("failed to read the long-format answer table")?;
  tracing::debug!(rows = records.len(), ?mode, "reshaping");

  let table = reshape(&records, &filter, mode);
  let mut out = io::stdout().lock();
  serde_json::to_writer_pretty(&mut out, &table)
    .context("failed to write the table")?;
  writeln!(out)?;
  Ok(())
}
