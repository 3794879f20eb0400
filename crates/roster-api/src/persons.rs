//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `GET`    | `/persons`      | Most recent first |
//! | `POST`   | `/persons`      | Body: `{"name","age","email"}`; returns 201 + stored person |
//! | `GET`    | `/persons/{id}` | 404 if not found |
//! | `PUT`    | `/persons/{id}` | Partial body; only supplied fields change |
//! | `DELETE` | `/persons/{id}` | Returns the removed person |
//!
//! Every handler takes [`CurrentIdentity`] first. Path and body are read as
//! raw strings and bytes so parsing failures use the API's own error shape.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use roster_core::{
  person::{Person, PersonId},
  store::PersonStore,
  validate::{validate_new, validate_patch},
};
use serde_json::Value;

use crate::{ApiState, auth::CurrentIdentity, error::ApiError};

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
  serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid request body".into()))
}

fn not_found() -> ApiError { ApiError::NotFound("Person not found".into()) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /persons`
pub async fn list<S>(
  _caller: CurrentIdentity,
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore + 'static,
{
  let persons = state.store.list().await.map_err(ApiError::from_store)?;
  Ok(Json(persons))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons` — returns 201 + the stored [`Person`].
pub async fn create<S>(
  CurrentIdentity(caller): CurrentIdentity,
  State(state): State<ApiState<S>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + 'static,
{
  let input = validate_new(&parse_body(&body)?)?;
  let person = state.store.create(input).await.map_err(ApiError::from_store)?;
  tracing::info!(person_id = %person.id, caller = caller.label(), "created person");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/{id}`
pub async fn get_one<S>(
  _caller: CurrentIdentity,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + 'static,
{
  let id: PersonId = id.parse()?;
  let person = state
    .store
    .get(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(not_found)?;
  Ok(Json(person))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /persons/{id}` — body holds any subset of `name`, `age`, `email`.
pub async fn update<S>(
  CurrentIdentity(caller): CurrentIdentity,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  body: Bytes,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + 'static,
{
  let id: PersonId = id.parse()?;
  let patch = validate_patch(&parse_body(&body)?)?;
  let person = state
    .store
    .update(id, patch)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(not_found)?;
  tracing::info!(person_id = %person.id, caller = caller.label(), "updated person");
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/{id}` — returns the person as it was before removal.
pub async fn delete_one<S>(
  CurrentIdentity(caller): CurrentIdentity,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + 'static,
{
  let id: PersonId = id.parse()?;
  let person = state
    .store
    .delete(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(not_found)?;
  tracing::info!(person_id = %person.id, caller = caller.label(), "deleted person");
  Ok(Json(person))
}
