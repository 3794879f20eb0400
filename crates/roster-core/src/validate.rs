//! Schema checks for incoming person payloads.
//!
//! Payloads arrive as untyped JSON so that every offending field can be
//! reported at once, rather than stopping at the first deserialisation error.
//!
//! | Field | Rule |
//! |-------|------|
//! | `name`  | string, non-empty after trimming |
//! | `age`   | positive integer; a string of decimal digits is also accepted |
//! | `email` | string, syntactically valid address |

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::ValidateEmail as _;

use crate::person::{NewPerson, PersonPatch};

/// Whether fields are required (`Create`) or optional (`Update`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Create,
  Update,
}

/// One rejected field and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

/// Every violation found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid person payload ({} field error(s))", .errors.len())]
pub struct ValidationError {
  pub errors: Vec<FieldError>,
}

impl ValidationError {
  pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { errors: vec![FieldError::new(field, message)] }
  }

  pub fn has_field(&self, field: &str) -> bool {
    self.errors.iter().any(|e| e.field == field)
  }
}

/// Check `payload` against the person rules for `mode`.
///
/// In [`Mode::Create`] a successful result has every field set.
pub fn validate(payload: &Value, mode: Mode) -> Result<PersonPatch, ValidationError> {
  let Some(obj) = payload.as_object() else {
    return Err(ValidationError::single("body", "expected a JSON object"));
  };

  let mut errors = Vec::new();

  let name = check_field(obj, "name", mode, &mut errors, parse_name);
  let age = check_field(obj, "age", mode, &mut errors, parse_age);
  let email = check_field(obj, "email", mode, &mut errors, parse_email);

  if !errors.is_empty() {
    return Err(ValidationError { errors });
  }

  Ok(PersonPatch { name, age, email })
}

/// Validate a create payload. All three fields are required.
pub fn validate_new(payload: &Value) -> Result<NewPerson, ValidationError> {
  match validate(payload, Mode::Create)? {
    PersonPatch { name: Some(name), age: Some(age), email: Some(email) } => {
      Ok(NewPerson { name, age, email })
    }
    // `validate` reports every missing field in create mode, so this arm is
    // only reachable if the rules above change.
    _ => Err(ValidationError::single("body", "missing required fields")),
  }
}

/// Validate an update payload. Every field is optional.
pub fn validate_patch(payload: &Value) -> Result<PersonPatch, ValidationError> {
  validate(payload, Mode::Update)
}

// ─── Field rules ─────────────────────────────────────────────────────────────

fn check_field<T>(
  obj: &Map<String, Value>,
  field: &str,
  mode: Mode,
  errors: &mut Vec<FieldError>,
  parse: fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
  match obj.get(field) {
    None | Some(Value::Null) => {
      if mode == Mode::Create {
        errors.push(FieldError::new(field, format!("{field} is required")));
      }
      None
    }
    Some(v) => match parse(v) {
      Ok(t) => Some(t),
      Err(msg) => {
        errors.push(FieldError::new(field, msg));
        None
      }
    },
  }
}

fn parse_name(v: &Value) -> Result<String, &'static str> {
  let s = v.as_str().ok_or("name must be a string")?.trim();
  if s.is_empty() {
    return Err("name must not be empty");
  }
  Ok(s.to_owned())
}

fn parse_age(v: &Value) -> Result<u32, &'static str> {
  const MSG: &str = "age must be a positive integer";
  let n = match v {
    Value::Number(n) => n.as_u64().ok_or(MSG)?,
    Value::String(s) => {
      let s = s.trim();
      if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MSG);
      }
      s.parse::<u64>().map_err(|_| MSG)?
    }
    _ => return Err(MSG),
  };
  match u32::try_from(n) {
    Ok(age) if age > 0 => Ok(age),
    _ => Err(MSG),
  }
}

fn parse_email(v: &Value) -> Result<String, &'static str> {
  let s = v.as_str().ok_or("email must be a string")?.trim().to_owned();
  if !s.validate_email() {
    return Err("email must be a valid email address");
  }
  Ok(s)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn create_accepts_complete_payload() {
    let p = validate_new(&json!({ "name": " Ann ", "age": 30, "email": "a@x.com" })).unwrap();
    assert_eq!(p, NewPerson { name: "Ann".into(), age: 30, email: "a@x.com".into() });
  }

  #[test]
  fn create_accepts_numeric_string_age() {
    let p = validate_new(&json!({ "name": "Ann", "age": "30", "email": "a@x.com" })).unwrap();
    assert_eq!(p.age, 30);
  }

  #[test]
  fn create_reports_every_missing_field() {
    let err = validate_new(&json!({})).unwrap_err();
    let fields: Vec<_> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["name", "age", "email"]);
  }

  #[test]
  fn null_counts_as_missing_on_create() {
    let err = validate_new(&json!({ "name": null, "age": 3, "email": "a@x.com" })).unwrap_err();
    assert!(err.has_field("name"));
    assert_eq!(err.errors.len(), 1);
  }

  #[test]
  fn collects_all_rule_violations() {
    let err = validate(
      &json!({ "name": "   ", "age": -1, "email": "not-an-email" }),
      Mode::Create,
    )
    .unwrap_err();
    assert_eq!(err.errors.len(), 3);
    assert!(err.has_field("name"));
    assert!(err.has_field("age"));
    assert!(err.has_field("email"));
  }

  #[test]
  fn age_rules() {
    for bad in [json!(0), json!(-5), json!(30.5), json!("abc"), json!(""), json!(true), json!(u64::MAX)] {
      assert!(parse_age(&bad).is_err(), "{bad} should be rejected");
    }
    assert_eq!(parse_age(&json!(1)), Ok(1));
    assert_eq!(parse_age(&json!(" 42 ")), Ok(42));
  }

  #[test]
  fn wrong_types_are_rejected() {
    let err = validate(&json!({ "name": 5, "email": ["a@x.com"] }), Mode::Update).unwrap_err();
    assert_eq!(err.errors[0], FieldError::new("name", "name must be a string"));
    assert_eq!(err.errors[1], FieldError::new("email", "email must be a string"));
  }

  #[test]
  fn update_allows_partial_payload() {
    let patch = validate_patch(&json!({ "age": 31 })).unwrap();
    assert_eq!(patch, PersonPatch { age: Some(31), ..Default::default() });
  }

  #[test]
  fn update_allows_empty_payload() {
    assert!(validate_patch(&json!({})).unwrap().is_empty());
  }

  #[test]
  fn update_still_checks_present_fields() {
    let err = validate_patch(&json!({ "email": "nope" })).unwrap_err();
    assert!(err.has_field("email"));
  }

  #[test]
  fn unknown_keys_including_id_are_ignored() {
    let patch = validate_patch(&json!({ "id": 99, "createdAt": "x", "name": "Bo" })).unwrap();
    assert_eq!(patch, PersonPatch { name: Some("Bo".into()), ..Default::default() });
  }

  #[test]
  fn non_object_payload_is_rejected() {
    let err = validate(&json!([1, 2]), Mode::Update).unwrap_err();
    assert_eq!(err, ValidationError::single("body", "expected a JSON object"));
  }
}
