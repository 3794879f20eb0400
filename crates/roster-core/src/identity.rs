//! Identity — who the current caller is, as asserted by the identity provider.
//!
//! Identities are never persisted. They live only as long as the request that
//! carried the credential.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  /// Stable provider-side identifier (the token's `sub` claim).
  pub subject: String,
  pub name:    Option<String>,
  pub email:   Option<String>,
}

impl Identity {
  /// A short label for log lines: the email if known, else the subject.
  pub fn label(&self) -> &str {
    self.email.as_deref().unwrap_or(&self.subject)
  }
}
