//! Error types for `roster-core`.

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid person id: {0:?}")]
  InvalidId(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
