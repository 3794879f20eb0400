//! HTTP server assembly for Roster.
//!
//! Loads [`ServerConfig`], and builds the top-level axum [`Router`]: the JSON
//! API under `/api`, a health probe, and an opt-in debug endpoint.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use roster_api::{ApiState, JwtSessionAuthority, SessionAuthority};
use roster_core::store::PersonStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Shared HS256 secret used to verify session tokens. Required.
  #[serde(default)]
  pub jwt_secret:      String,
  #[serde(default)]
  pub jwt_issuer:      Option<String>,
  #[serde(default)]
  pub jwt_audience:    Option<String>,
  #[serde(default)]
  pub debug_endpoints: bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

impl ServerConfig {
  /// Read `path` (optional) and overlay `ROSTER_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> { Self::load_with_env(path, None) }

  /// As [`ServerConfig::load`], reading variables from `env` instead of the
  /// process environment when given. Values stay strings until deserialised,
  /// so secrets such as `000123` are kept verbatim.
  pub fn load_with_env(
    path: &Path,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROSTER").source(env))
      .build()?
      .try_deserialize()
  }

  /// Names of required settings that are absent or blank.
  pub fn missing_required(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.jwt_secret.trim().is_empty() {
      missing.push("jwt_secret");
    }
    missing
  }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Build the token verifier described by this configuration.
  pub fn session_authority(&self) -> JwtSessionAuthority {
    let mut authority = JwtSessionAuthority::new(self.jwt_secret.as_bytes());
    if let Some(iss) = non_blank(&self.jwt_issuer) {
      authority = authority.with_issuer(iss);
    }
    if let Some(aud) = non_blank(&self.jwt_audience) {
      authority = authority.with_audience(aud);
    }
    authority
  }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
  v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Debug info ───────────────────────────────────────────────────────────────

/// Which settings are present. Never carries secret values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvInfo {
  pub has_jwt_secret:   bool,
  pub has_jwt_issuer:   bool,
  pub has_jwt_audience: bool,
  pub bind_address:     String,
  pub version:          &'static str,
}

impl From<&ServerConfig> for EnvInfo {
  fn from(c: &ServerConfig) -> Self {
    EnvInfo {
      has_jwt_secret:   !c.jwt_secret.trim().is_empty(),
      has_jwt_issuer:   non_blank(&c.jwt_issuer).is_some(),
      has_jwt_audience: non_blank(&c.jwt_audience).is_some(),
      bind_address:     c.bind_address(),
      version:          env!("CARGO_PKG_VERSION"),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router for `store` under `config`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: PersonStore + 'static,
{
  let sessions: Arc<dyn SessionAuthority> = Arc::new(config.session_authority());
  let api = roster_api::api_router(ApiState::new(store, sessions));

  let mut app = Router::new()
    .route("/healthz", get(|| async { Json(json!({ "status": "ok" })) }))
    .nest("/api", api);

  if config.debug_endpoints {
    let info = EnvInfo::from(config);
    app = app.route("/debug/env", get(move || async move { Json(info) }));
  }

  app.layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
