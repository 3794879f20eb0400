//! Plain-text rendering of API results.

use roster_core::{identity::Identity, person::Person};

const HEADERS: [&str; 4] = ["ID", "NAME", "AGE", "EMAIL"];

/// Render `persons` as a left-aligned table, one row per person.
pub fn person_table(persons: &[Person]) -> String {
  if persons.is_empty() {
    return "No persons.\n".to_string();
  }

  let rows: Vec<[String; 4]> = persons
    .iter()
    .map(|p| {
      [
        p.id.to_string(),
        p.name.clone(),
        p.age.to_string(),
        p.email.clone(),
      ]
    })
    .collect();

  let mut widths = HEADERS.map(|h| h.chars().count());
  for row in &rows {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_row(&mut out, &HEADERS.map(String::from), &widths);
  for row in &rows {
    push_row(&mut out, row, &widths);
  }
  out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
  let line = cells
    .iter()
    .zip(widths)
    .map(|(c, w)| format!("{c:<w$}"))
    .collect::<Vec<_>>()
    .join("  ");
  out.push_str(line.trim_end());
  out.push('\n');
}

/// Render a single person as `key: value` lines.
pub fn person_detail(p: &Person) -> String {
  format!(
    "id:      {}\nname:    {}\nage:     {}\nemail:   {}\ncreated: {}\nupdated: {}\n",
    p.id,
    p.name,
    p.age,
    p.email,
    p.created_at.to_rfc3339(),
    p.updated_at.to_rfc3339(),
  )
}

pub fn identity_detail(id: &Identity) -> String {
  let mut out = format!("subject: {}\n", id.subject);
  if let Some(name) = &id.name {
    out.push_str(&format!("name:    {name}\n"));
  }
  if let Some(email) = &id.email {
    out.push_str(&format!("email:   {email}\n"));
  }
  out
}
