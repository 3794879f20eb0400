//! `roster` — command-line client for the Roster person registry.
//!
//! # Usage
//!
//! ```
//! roster --url http://localhost:3000 --token "$(roster-server --issue-token --subject me)" list
//! roster --config ~/.config/roster/config.toml add --name Ann --age 31 --email ann@example.com
//! ```

mod client;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use roster_core::person::{NewPerson, PersonId, PersonPatch};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Command-line client for the Roster person registry")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the roster server (default: http://localhost:3000).
  #[arg(long, env = "ROSTER_URL")]
  url: Option<String>,

  /// Session token sent as a bearer credential.
  #[arg(long, env = "ROSTER_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Print raw JSON instead of tables.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every person, newest first.
  List,
  /// Show one person.
  Get { id: PersonId },
  /// Register a new person.
  Add {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    age:   u32,
    #[arg(long)]
    email: String,
  },
  /// Change some fields of a person.
  Update {
    id:    PersonId,
    #[arg(long)]
    name:  Option<String>,
    #[arg(long)]
    age:   Option<u32>,
    #[arg(long)]
    email: Option<String>,
  },
  /// Remove a person.
  Delete { id: PersonId },
  /// Show the identity behind the current token.
  Whoami,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

impl ConfigFile {
  fn read(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// CLI flags override the config file, which overrides defaults.
fn resolve(url: Option<String>, token: Option<String>, file: ConfigFile) -> ApiConfig {
  ApiConfig {
    base_url: url
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    token:    token
      .or_else(|| (!file.token.is_empty()).then(|| file.token.clone()))
      .unwrap_or_default(),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => ConfigFile::read(path)?,
    None => ConfigFile::default(),
  };
  let api_config = resolve(args.url, args.token, file_cfg);
  if api_config.token.is_empty() {
    tracing::warn!("no session token configured; the server will answer 401");
  }
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;
  run(&client, args.command, args.json).await
}

async fn run(client: &ApiClient, command: Command, json: bool) -> Result<()> {
  match command {
    Command::List => {
      let persons = client.list_persons().await?;
      emit(json, &persons, || render::person_table(&persons))
    }
    Command::Get { id } => {
      let person = client.get_person(id).await?;
      emit(json, &person, || render::person_detail(&person))
    }
    Command::Add { name, age, email } => {
      let person = client.create_person(&NewPerson { name, age, email }).await?;
      emit(json, &person, || render::person_detail(&person))
    }
    Command::Update { id, name, age, email } => {
      let patch = PersonPatch { name, age, email };
      anyhow::ensure!(!patch.is_empty(), "nothing to update: pass --name, --age or --email");
      let person = client.update_person(id, &patch).await?;
      emit(json, &person, || render::person_detail(&person))
    }
    Command::Delete { id } => {
      let person = client.delete_person(id).await?;
      emit(json, &person, || format!("Deleted {} ({}).\n", person.name, person.id))
    }
    Command::Whoami => {
      let identity = client.whoami().await?;
      emit(json, &identity, || render::identity_detail(&identity))
    }
  }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(value).context("serialising output")?);
  } else {
    print!("{}", text());
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_beat_file_and_file_beats_default() {
    let file = ConfigFile { url: "http://file:1".into(), token: "file-token".into() };
    let cfg = resolve(Some("http://flag:2".into()), None, file);
    assert_eq!(cfg.base_url, "http://flag:2");
    assert_eq!(cfg.token, "file-token");

    let cfg = resolve(None, None, ConfigFile::default());
    assert_eq!(cfg.base_url, DEFAULT_URL);
    assert_eq!(cfg.token, "");
  }

  #[test]
  fn config_file_fields_are_optional() {
    let file: ConfigFile = toml::from_str("token = \"abc\"\n").unwrap();
    assert_eq!(file.url, "");
    assert_eq!(file.token, "abc");
  }

  #[test]
  fn ids_are_parsed_strictly() {
    let args = Args::try_parse_from(["roster", "get", "42"]).unwrap();
    assert!(matches!(args.command, Command::Get { id } if id == PersonId(42)));
    assert!(Args::try_parse_from(["roster", "get", "-1"]).is_err());
    assert!(Args::try_parse_from(["roster", "delete", "abc"]).is_err());
  }
}
