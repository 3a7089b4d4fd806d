//! Async HTTP client for the survey platform's v5 REST API.

use std::time::Duration;

use alchemy_core::{
  payload::{Envelope, Page, QuestionPayload, ResponsePayload, SurveyPayload},
  source::SurveySource,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "https://api.alchemer.com";
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no {0} configured")]
  MissingCredential(&'static str),

  #[error("failed to build HTTP client")]
  Build(#[source] reqwest::Error),

  #[error("GET {path} failed")]
  Transport {
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("received {status} when fetching {path}")]
  Status { path: String, status: StatusCode },

  #[error("could not decode the body of GET {path}")]
  Decode {
    path:   String,
    #[source]
    source: reqwest::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Connection settings for the survey platform.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub host:             String,
  pub api_key:          String,
  pub api_secret:       String,
  pub results_per_page: u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      host:             DEFAULT_HOST.to_owned(),
      api_key:          String::new(),
      api_secret:       String::new(),
      results_per_page: DEFAULT_RESULTS_PER_PAGE,
    }
  }
}

/// Authenticated client for the platform's survey endpoints.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    if config.api_key.is_empty() {
      return Err(Error::MissingCredential("API key"));
    }
    if config.api_secret.is_empty() {
      return Err(Error::MissingCredential("API secret"));
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .map_err(Error::Build)?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/v5{}", self.config.host.trim_end_matches('/'), path)
  }

  /// `GET /v5{path}` with credentials, plus paging parameters when `page`
  /// is set.
  ///
  /// Credentials travel as query parameters, so transport errors have their
  /// URL stripped before they are returned.
  async fn get<T: DeserializeOwned>(
    &self,
    path: String,
    page: Option<u32>,
  ) -> Result<T> {
    let mut query = vec![
      ("api_token", self.config.api_key.clone()),
      ("api_token_secret", self.config.api_secret.clone()),
    ];
    if let Some(page) = page {
      query.push(("resultsperpage", self.config.results_per_page.to_string()));
      query.push(("page", page.to_string()));
    }

    tracing::debug!(%path, ?page, "GET");
    let resp = match self.client.get(self.url(&path)).query(&query).send().await {
      Ok(resp) => resp,
      Err(source) => {
        return Err(Error::Transport { path, source: source.without_url() });
      }
    };

    let path = check_status(path, resp.status())?;
    resp
      .json()
      .await
      .map_err(|source| Error::Decode { path, source: source.without_url() })
  }
}

/// Anything but `200 OK` is fatal, including other 2xx codes.
fn check_status(path: String, status: StatusCode) -> Result<String> {
  if status != StatusCode::OK {
    return Err(Error::Status { path, status });
  }
  Ok(path)
}

// ─── SurveySource impl ───────────────────────────────────────────────────────

impl SurveySource for ApiClient {
  type Error = Error;

  async fn survey(&self, survey_id: i64) -> Result<SurveyPayload> {
    let envelope: Envelope<SurveyPayload> =
      self.get(format!("/survey/{survey_id}"), None).await?;
    Ok(envelope.data)
  }

  async fn questions(
    &self,
    survey_id: i64,
    page: u32,
  ) -> Result<Page<QuestionPayload>> {
    self
      .get(format!("/survey/{survey_id}/surveyquestion"), Some(page))
      .await
  }

  async fn responses(
    &self,
    survey_id: i64,
    page: u32,
  ) -> Result<Page<ResponsePayload>> {
    self
      .get(format!("/survey/{survey_id}/surveyresponse"), Some(page))
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> ApiConfig {
    ApiConfig {
      api_key: "key".into(),
      api_secret: "secret".into(),
      ..ApiConfig::default()
    }
  }

  #[test]
  fn credentials_are_required() {
    let missing_key = ApiClient::new(ApiConfig {
      api_key: String::new(),
      ..config()
    });
    assert!(matches!(missing_key, Err(Error::MissingCredential("API key"))));

    let missing_secret = ApiClient::new(ApiConfig {
      api_secret: String::new(),
      ..config()
    });
    assert!(matches!(
      missing_secret,
      Err(Error::MissingCredential("API secret"))
    ));
  }

  #[test]
  fn urls_are_rooted_at_v5() {
    let client = ApiClient::new(ApiConfig {
      host: "https://api.example.test/".into(),
      ..config()
    })
    .unwrap();
    assert_eq!(
      client.url("/survey/12/surveyquestion"),
      "https://api.example.test/v5/survey/12/surveyquestion"
    );
  }

  #[test]
  fn only_200_is_accepted() {
    assert_eq!(
      check_status("/survey/12".into(), StatusCode::OK).unwrap(),
      "/survey/12"
    );
    for status in [StatusCode::NO_CONTENT, StatusCode::ACCEPTED, StatusCode::FOUND] {
      assert!(matches!(
        check_status("/survey/12".into(), status),
        Err(Error::Status { status: s, .. }) if s == status
      ));
    }
  }

  #[test]
  fn status_errors_name_the_path() {
    let err = Error::Status {
      path:   "/survey/12".into(),
      status: StatusCode::NOT_FOUND,
    };
    assert_eq!(
      err.to_string(),
      "received 404 Not Found when fetching /survey/12"
    );
  }
}
