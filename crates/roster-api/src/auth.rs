//! Session authority: "who is calling, if anyone".
//!
//! The OAuth handshake and token issuance belong to the identity provider.
//! This module only inspects the bearer token a request carries. An absent or
//! unusable token is a normal outcome (an anonymous caller), not an error.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use roster_core::{identity::Identity, store::PersonStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ApiState, error::ApiError};

/// Resolves the caller's identity from request headers.
pub trait SessionAuthority: Send + Sync + 'static {
  fn current_identity(&self, headers: &HeaderMap) -> Option<Identity>;
}

// ─── JWT implementation ──────────────────────────────────────────────────────

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  pub exp:   i64,
  pub iat:   i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub iss:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub aud:   Option<String>,
}

impl From<Claims> for Identity {
  fn from(c: Claims) -> Self {
    Identity { subject: c.sub, name: c.name, email: c.email }
  }
}

/// Why a token could not be minted.
#[derive(Debug, Error)]
pub enum IssueError {
  #[error("token lifetime is out of range")]
  TtlOutOfRange,
  #[error("failed to sign token: {0}")]
  Sign(#[from] jsonwebtoken::errors::Error),
}

/// Verifies HS256 session tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtSessionAuthority {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  issuer:     Option<String>,
  audience:   Option<String>,
}

impl JwtSessionAuthority {
  pub fn new(secret: &[u8]) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      issuer: None,
      audience: None,
    }
  }

  /// Require (and stamp) an `iss` claim.
  pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
    let issuer = issuer.into();
    self.validation.set_issuer(&[&issuer]);
    self.validation.required_spec_claims.insert("iss".to_owned());
    self.issuer = Some(issuer);
    self
  }

  /// Require (and stamp) an `aud` claim.
  pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
    let audience = audience.into();
    self.validation.set_audience(&[&audience]);
    self.validation.validate_aud = true;
    self.validation.required_spec_claims.insert("aud".to_owned());
    self.audience = Some(audience);
    self
  }

  /// Mint a token for `identity` valid for `ttl`.
  pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, IssueError> {
    let now = Utc::now();
    let exp = now.checked_add_signed(ttl).ok_or(IssueError::TtlOutOfRange)?;
    let claims = Claims {
      sub:   identity.subject.clone(),
      name:  identity.name.clone(),
      email: identity.email.clone(),
      exp:   exp.timestamp(),
      iat:   now.timestamp(),
      iss:   self.issuer.clone(),
      aud:   self.audience.clone(),
    };
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
  }

  /// Check the signature, expiry, and any configured issuer/audience.
  pub fn verify(&self, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
    Ok(data.claims.into())
  }
}

impl SessionAuthority for JwtSessionAuthority {
  fn current_identity(&self, headers: &HeaderMap) -> Option<Identity> {
    let token = bearer_token(headers)?;
    match self.verify(token) {
      Ok(identity) => Some(identity),
      Err(e) => {
        tracing::debug!(error = %e, "rejected session token");
        None
      }
    }
  }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  let token = token.trim();
  (!token.is_empty()).then_some(token)
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated caller. Handlers take this as their first argument, so
/// an anonymous request is rejected with 401 before anything else is read.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<ApiState<S>> for CurrentIdentity
where
  S: PersonStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    state
      .sessions
      .current_identity(&parts.headers)
      .map(CurrentIdentity)
      .ok_or(ApiError::Unauthorized)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn ann() -> Identity {
    Identity {
      subject: "google-123".into(),
      name:    Some("Ann".into()),
      email:   Some("ann@example.com".into()),
    }
  }

  fn headers_with(auth: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
    h
  }

  #[test]
  fn valid_token_yields_identity() {
    let authority = JwtSessionAuthority::new(b"secret");
    let token = authority.issue(&ann(), Duration::hours(1)).unwrap();
    let got = authority.current_identity(&headers_with(&format!("Bearer {token}")));
    assert_eq!(got, Some(ann()));
  }

  #[test]
  fn scheme_is_case_insensitive() {
    let authority = JwtSessionAuthority::new(b"secret");
    let token = authority.issue(&ann(), Duration::hours(1)).unwrap();
    assert!(authority.current_identity(&headers_with(&format!("bearer {token}"))).is_some());
  }

  #[test]
  fn missing_header_is_anonymous() {
    let authority = JwtSessionAuthority::new(b"secret");
    assert_eq!(authority.current_identity(&HeaderMap::new()), None);
  }

  #[test]
  fn wrong_scheme_is_anonymous() {
    let authority = JwtSessionAuthority::new(b"secret");
    assert_eq!(authority.current_identity(&headers_with("Basic dXNlcjpwYXNz")), None);
  }

  #[test]
  fn garbage_token_is_anonymous() {
    let authority = JwtSessionAuthority::new(b"secret");
    assert_eq!(authority.current_identity(&headers_with("Bearer not.a.jwt")), None);
  }

  #[test]
  fn token_signed_with_other_secret_is_rejected() {
    let issuer = JwtSessionAuthority::new(b"other");
    let token = issuer.issue(&ann(), Duration::hours(1)).unwrap();
    let authority = JwtSessionAuthority::new(b"secret");
    assert!(authority.verify(&token).is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let authority = JwtSessionAuthority::new(b"secret");
    let token = authority.issue(&ann(), Duration::hours(-2)).unwrap();
    assert!(authority.verify(&token).is_err());
  }

  #[test]
  fn audience_and_issuer_are_enforced_when_configured() {
    let strict = JwtSessionAuthority::new(b"secret")
      .with_issuer("https://accounts.example.com")
      .with_audience("roster");
    let good = strict.issue(&ann(), Duration::hours(1)).unwrap();
    assert!(strict.verify(&good).is_ok());

    let lax = JwtSessionAuthority::new(b"secret");
    let bare = lax.issue(&ann(), Duration::hours(1)).unwrap();
    assert!(strict.verify(&bare).is_err());
  }

  #[test]
  fn configured_issuer_must_be_present_in_token() {
    let strict = JwtSessionAuthority::new(b"secret").with_issuer("https://accounts.example.com");
    let bare = JwtSessionAuthority::new(b"secret").issue(&ann(), Duration::hours(1)).unwrap();
    assert!(strict.verify(&bare).is_err());
    assert!(strict.current_identity(&headers_with(&format!("Bearer {bare}"))).is_none());
  }

  #[test]
  fn configured_audience_must_be_present_in_token() {
    let strict = JwtSessionAuthority::new(b"secret").with_audience("roster");
    let bare = JwtSessionAuthority::new(b"secret").issue(&ann(), Duration::hours(1)).unwrap();
    assert!(strict.verify(&bare).is_err());

    let other = JwtSessionAuthority::new(b"secret")
      .with_audience("someone-else")
      .issue(&ann(), Duration::hours(1))
      .unwrap();
    assert!(strict.verify(&other).is_err());
  }

  #[test]
  fn expiry_is_still_required_with_issuer_configured() {
    let strict = JwtSessionAuthority::new(b"secret").with_issuer("https://idp");
    assert!(strict.validation.required_spec_claims.contains("exp"));
    assert!(strict.validation.required_spec_claims.contains("iss"));
  }

  #[test]
  fn overflowing_ttl_is_refused() {
    let authority = JwtSessionAuthority::new(b"secret");
    let err = authority.issue(&ann(), Duration::days(100_000_000_000)).unwrap_err();
    assert!(matches!(err, IssueError::TtlOutOfRange));
  }
}
