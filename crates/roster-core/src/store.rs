//! The `PersonStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`, `roster-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::person::{NewPerson, Person, PersonId, PersonPatch};

/// Errors a [`PersonStore`] can return.
///
/// Backends keep their own error enums; this trait only exposes what the
/// HTTP layer needs to pick a status code.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The email that collided, if this error is a uniqueness violation.
  fn conflicting_email(&self) -> Option<&str>;
}

impl StoreError for std::convert::Infallible {
  fn conflicting_email(&self) -> Option<&str> { match *self {} }
}

/// Abstraction over a person storage backend.
///
/// Email uniqueness must be enforced by the backend itself at write time,
/// atomically with the write. A check-then-insert sequence is not enough.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: StoreError;

  /// All persons, most recently created first (identifier descending).
  fn list(&self) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Persist a new person. The id and both timestamps are set by the store.
  ///
  /// Fails with an error whose [`StoreError::conflicting_email`] is `Some` if
  /// another person already holds `input.email`.
  fn create(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Apply `patch` to an existing person and bump `updated_at`.
  ///
  /// Returns `None` if `id` does not exist. Fails with a conflict if the
  /// patched email belongs to a different person.
  fn update(
    &self,
    id: PersonId,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Remove a person, returning its state prior to removal. Returns `None` if
  /// `id` does not exist.
  fn delete(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;
}
