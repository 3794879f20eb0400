//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use roster_core::person::{Person, PersonId};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str = "id, name, age, email, created_at, updated_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:         i64,
  pub name:       String,
  pub age:        i64,
  pub email:      String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      id:         row.get(0)?,
      name:       row.get(1)?,
      age:        row.get(2)?,
      email:      row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    let age = u32::try_from(self.age)
      .map_err(|_| Error::CorruptRow(format!("person {} has age {}", self.id, self.age)))?;

    Ok(Person {
      id: PersonId(self.id),
      name: self.name,
      age,
      email: self.email,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dt_round_trips_through_rfc3339() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn garbage_timestamp_is_a_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn negative_age_is_corrupt() {
    let raw = RawPerson {
      id:         1,
      name:       "Ann".into(),
      age:        -4,
      email:      "a@x.com".into(),
      created_at: encode_dt(Utc::now()),
      updated_at: encode_dt(Utc::now()),
    };
    assert!(matches!(raw.into_person(), Err(Error::CorruptRow(_))));
  }
}
