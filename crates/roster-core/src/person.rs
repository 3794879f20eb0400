//! Person records and the inputs that create or modify them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Store-assigned identifier of a [`Person`]. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for PersonId {
  type Err = Error;

  /// Accepts plain decimal digits only: no sign, no whitespace, no zero.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
      return Err(Error::InvalidId(s.to_owned()));
    }
    match s.parse::<i64>() {
      Ok(n) if n > 0 => Ok(PersonId(n)),
      _ => Err(Error::InvalidId(s.to_owned())),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A stored person. `id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         PersonId,
  pub name:       String,
  pub age:        u32,
  pub email:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A validated create request. Built by [`crate::validate::validate_new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:  String,
  pub age:   u32,
  pub email: String,
}

/// A validated partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub age:   Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
}

impl PersonPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.age.is_none() && self.email.is_none()
  }

  /// Apply this patch to `person`, stamping `updated_at` with `now`.
  pub fn apply(self, person: &mut Person, now: DateTime<Utc>) {
    if let Some(name) = self.name {
      person.name = name;
    }
    if let Some(age) = self.age {
      person.age = age;
    }
    if let Some(email) = self.email {
      person.email = email;
    }
    person.updated_at = now;
  }
}

impl From<NewPerson> for PersonPatch {
  fn from(p: NewPerson) -> Self {
    PersonPatch {
      name:  Some(p.name),
      age:   Some(p.age),
      email: Some(p.email),
    }
  }
}
