//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the API as `{"error": "...", "details": [...]}`,
//! with `details` present only for validation failures.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use roster_core::{
  store::StoreError,
  validate::{FieldError, ValidationError},
};
use serde::Serialize;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error: uniqueness violations become `Conflict`,
  /// everything else is internal.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.conflicting_email() {
      Some(email) => ApiError::Conflict(format!("email {email} is already in use")),
      None => ApiError::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    match e {
      roster_core::Error::InvalidId(_) => ApiError::Validation(ValidationError::single(
        "id",
        "id must be a positive integer",
      )),
      roster_core::Error::Validation(v) => ApiError::Validation(v),
    }
  }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub error:   String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match self {
      ApiError::Unauthorized => ErrorBody { error: "Unauthorized".into(), details: None },
      ApiError::Validation(v) => ErrorBody {
        error:   "Validation failed".into(),
        details: Some(v.errors),
      },
      ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Conflict(m) => {
        ErrorBody { error: m, details: None }
      }
      ApiError::Store(e) => {
        tracing::error!(error = ?e, "store failure");
        ErrorBody { error: "Internal server error".into(), details: None }
      }
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum FakeStoreError {
    #[error("email taken: {0}")]
    Taken(String),
    #[error("disk on fire at /var/lib/secret.db")]
    Disk,
  }

  impl StoreError for FakeStoreError {
    fn conflicting_email(&self) -> Option<&str> {
      match self {
        FakeStoreError::Taken(e) => Some(e),
        FakeStoreError::Disk => None,
      }
    }
  }

  async fn body_json(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[test]
  fn store_conflicts_map_to_409() {
    let e = ApiError::from_store(FakeStoreError::Taken("a@x.com".into()));
    assert_eq!(e.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn internal_errors_hide_their_cause() {
    let res = ApiError::from_store(FakeStoreError::Disk).into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(res).await;
    assert_eq!(json, serde_json::json!({ "error": "Internal server error" }));
  }

  #[tokio::test]
  async fn validation_errors_carry_details() {
    let err = ValidationError {
      errors: vec![
        FieldError::new("name", "name is required"),
        FieldError::new("age", "age must be a positive integer"),
      ],
    };
    let res = ApiError::from(err).into_response();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["details"][0]["field"], "name");
    assert_eq!(json["details"][1]["message"], "age must be a positive integer");
  }

  #[tokio::test]
  async fn unauthorized_sets_challenge_header() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body_json(res).await, serde_json::json!({ "error": "Unauthorized" }));
  }

  #[test]
  fn malformed_id_is_a_field_error() {
    let err = ApiError::from(roster_core::Error::InvalidId("abc".into()));
    match err {
      ApiError::Validation(v) => assert!(v.has_field("id")),
      other => panic!("expected validation error, got {other:?}"),
    }
  }
}
