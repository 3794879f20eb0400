//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::PersonStore`]
//! and guarded by a [`SessionAuthority`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod persons;
pub mod session;

use std::sync::Arc;

use axum::{Router, routing::get};
use roster_core::store::PersonStore;

pub use auth::{CurrentIdentity, IssueError, JwtSessionAuthority, SessionAuthority};
pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub sessions: Arc<dyn SessionAuthority>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, sessions: Arc<dyn SessionAuthority>) -> Self {
    Self { store, sessions }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>)
        .put(persons::update::<S>)
        .delete(persons::delete_one::<S>),
    )
    .route("/session", get(session::whoami))
    .with_state(state)
}
