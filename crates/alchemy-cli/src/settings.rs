//! Runtime settings: an optional TOML file, then `ALCHEMY_*` environment
//! variables, then built-in defaults.

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::client::{ApiConfig, DEFAULT_HOST, DEFAULT_RESULTS_PER_PAGE};

pub const ENV_PREFIX: &str = "ALCHEMY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub api_key:          String,
  #[serde(default)]
  pub api_secret:       String,
  #[serde(default = "default_host")]
  pub api_host:         String,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  #[serde(default = "default_results_per_page")]
  pub results_per_page: u32,
}

fn default_host() -> String { DEFAULT_HOST.to_owned() }

fn default_store_path() -> PathBuf { PathBuf::from("alchemy.db") }

fn default_results_per_page() -> u32 { DEFAULT_RESULTS_PER_PAGE }

impl Settings {
  /// Load settings. A `file` that is given must exist.
  pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(File::from(path).required(true));
    }
    Self::from_builder(
      builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
    )
  }

  fn from_builder(
    builder: ConfigBuilder<DefaultState>,
  ) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      host:             self.api_host.clone(),
      api_key:          self.api_key.clone(),
      api_secret:       self.api_secret.clone(),
      results_per_page: self.results_per_page,
    }
  }
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  #[test]
  fn defaults_fill_every_gap() {
    let s = Settings::from_builder(Config::builder()).unwrap();
    assert_eq!(s.api_key, "");
    assert_eq!(s.api_host, DEFAULT_HOST);
    assert_eq!(s.store_path, PathBuf::from("alchemy.db"));
    assert_eq!(s.results_per_page, 100);
  }

  #[test]
  fn file_values_override_defaults() {
    let toml = r#"
      api_key          = "k"
      api_secret       = "s"
      store_path       = "/var/lib/alchemy/answers.db"
      results_per_page = 250
    "#;
    let s = Settings::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap();

    let api = s.api();
    assert_eq!(api.api_key, "k");
    assert_eq!(api.api_secret, "s");
    assert_eq!(api.results_per_page, 250);
    assert_eq!(api.host, DEFAULT_HOST);
    assert_eq!(s.store_path, PathBuf::from("/var/lib/alchemy/answers.db"));
  }

  #[test]
  fn missing_explicit_file_is_an_error() {
    assert!(Settings::load(Some(Path::new("/nonexistent/alchemy.toml"))).is_err());
  }
}
