//! Error type for `roster-store-sqlite`.

use roster_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value the domain types cannot represent.
  #[error("corrupt row: {0}")]
  CorruptRow(String),

  /// The `UNIQUE` constraint on `persons.email` rejected a write.
  #[error("email already in use: {0}")]
  EmailTaken(String),
}

impl StoreError for Error {
  fn conflicting_email(&self) -> Option<&str> {
    match self {
      Error::EmailTaken(email) => Some(email),
      _ => None,
    }
  }
}

/// Whether `e` is SQLite reporting a `UNIQUE` constraint failure.
pub(crate) fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
