//! Async HTTP client wrapping the roster JSON API.

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use roster_core::{
  identity::Identity,
  person::{NewPerson, Person, PersonId, PersonPatch},
};
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    String,
}

/// Async HTTP client for the roster JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
  pub error:   String,
  #[serde(default)]
  pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
  pub field:   String,
  pub message: String,
}

/// Render a failed call as one line per problem.
pub fn describe_failure(what: &str, status: reqwest::StatusCode, body: Option<ErrorBody>) -> String {
  let mut out = format!("{what} → {status}");
  if let Some(body) = body {
    out.push_str(": ");
    out.push_str(&body.error);
    for d in body.details {
      out.push_str(&format!("\n  {}: {}", d.field, d.message));
    }
  }
  out
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.token.is_empty() {
      req
    } else {
      req.bearer_auth(&self.config.token)
    }
  }

  /// Pass successful responses through; turn anything else into an error that
  /// carries the server's message and field details.
  async fn check(what: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.json::<ErrorBody>().await.ok();
    Err(anyhow!(describe_failure(what, status, body)))
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// `GET /api/session`
  pub async fn whoami(&self) -> Result<Identity> {
    let resp = self
      .auth(self.client.get(self.url("/session")))
      .send()
      .await
      .context("GET /session failed")?;
    let resp = Self::check("GET /session", resp).await?;
    resp.json().await.context("deserialising identity")
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  /// `GET /api/persons`
  pub async fn list_persons(&self) -> Result<Vec<Person>> {
    let resp = self
      .auth(self.client.get(self.url("/persons")))
      .send()
      .await
      .context("GET /persons failed")?;
    let resp = Self::check("GET /persons", resp).await?;
    resp.json().await.context("deserialising persons")
  }

  /// `GET /api/persons/{id}`
  pub async fn get_person(&self, id: PersonId) -> Result<Person> {
    let what = format!("GET /persons/{id}");
    let resp = self
      .auth(self.client.get(self.url(&format!("/persons/{id}"))))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = Self::check(&what, resp).await?;
    resp.json().await.context("deserialising person")
  }

  /// `POST /api/persons`
  pub async fn create_person(&self, input: &NewPerson) -> Result<Person> {
    let resp = self
      .auth(self.client.post(self.url("/persons")))
      .json(input)
      .send()
      .await
      .context("POST /persons failed")?;
    let resp = Self::check("POST /persons", resp).await?;
    resp.json().await.context("deserialising created person")
  }

  /// `PUT /api/persons/{id}`
  pub async fn update_person(&self, id: PersonId, patch: &PersonPatch) -> Result<Person> {
    let what = format!("PUT /persons/{id}");
    let resp = self
      .auth(self.client.put(self.url(&format!("/persons/{id}"))))
      .json(patch)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = Self::check(&what, resp).await?;
    resp.json().await.context("deserialising updated person")
  }

  /// `DELETE /api/persons/{id}`
  pub async fn delete_person(&self, id: PersonId) -> Result<Person> {
    let what = format!("DELETE /persons/{id}");
    let resp = self
      .auth(self.client.delete(self.url(&format!("/persons/{id}"))))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = Self::check(&what, resp).await?;
    resp.json().await.context("deserialising deleted person")
  }
}
