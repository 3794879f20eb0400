//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use roster_core::{
  person::{NewPerson, Person, PersonId, PersonPatch},
  store::PersonStore,
};

use crate::{
  encode::{encode_dt, RawPerson, PERSON_COLUMNS},
  error::is_unique_violation,
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster person store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls are
/// serialised onto one connection thread, and each write is a single statement
/// or a single transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Turn a failed write into [`Error::EmailTaken`] when the unique index on
/// `email` rejected it, otherwise into a plain database error.
fn write_error(e: tokio_rusqlite::Error, email: Option<&str>) -> Error {
  match email {
    Some(email) if is_unique_violation(&e) => Error::EmailTaken(email.to_owned()),
    _ => Error::Database(e),
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  async fn list(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY id DESC"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get(&self, id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            rusqlite::params![id.0],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn create(&self, input: NewPerson) -> Result<Person> {
    let now = Utc::now();
    let at_str = encode_dt(now);

    let NewPerson { name, age, email } = input;
    let name_col  = name.clone();
    let email_col = email.clone();

    // No pre-check: the UNIQUE index is the only arbiter of email collisions.
    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (name, age, email, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![name_col, age, email_col, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| write_error(e, Some(&email)))?;

    Ok(Person {
      id: PersonId(id),
      name,
      age,
      email,
      created_at: now,
      updated_at: now,
    })
  }

  async fn update(&self, id: PersonId, patch: PersonPatch) -> Result<Option<Person>> {
    let at_str = encode_dt(Utc::now());
    let new_email = patch.email.clone();

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current = tx
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            rusqlite::params![id.0],
            RawPerson::from_row,
          )
          .optional()?;
        let Some(mut raw) = current else {
          return Ok(None);
        };

        if let Some(name) = patch.name {
          raw.name = name;
        }
        if let Some(age) = patch.age {
          raw.age = i64::from(age);
        }
        if let Some(email) = patch.email {
          raw.email = email;
        }
        raw.updated_at = at_str;

        tx.execute(
          "UPDATE persons SET name = ?2, age = ?3, email = ?4, updated_at = ?5
           WHERE id = ?1",
          rusqlite::params![raw.id, raw.name, raw.age, raw.email, raw.updated_at],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await
      .map_err(|e| write_error(e, new_email.as_deref()))?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete(&self, id: PersonId) -> Result<Option<Person>> {
    // RETURNING hands back the prior row from the same statement that
    // removes it.
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("DELETE FROM persons WHERE id = ?1 RETURNING {PERSON_COLUMNS}"),
            rusqlite::params![id.0],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }
}
