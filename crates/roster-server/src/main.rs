//! roster-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus `ROSTER_*`
//! environment variables, opens the SQLite store, and serves the JSON API.
//!
//! # Token generation
//!
//! To mint a session token for local testing:
//!
//! ```
//! cargo run -p roster-server -- --issue-token --subject dev --email dev@example.com
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::Duration;
use clap::Parser;
use roster_core::identity::Identity;
use roster_server::{ServerConfig, expand_tilde};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const MAX_TTL_HOURS: i64 = 24 * 366;

#[derive(Parser)]
#[command(author, version, about = "Roster person registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a signed session token for the identity below and exit.
  #[arg(long)]
  issue_token: bool,

  /// Subject (`sub` claim) of the issued token.
  #[arg(long, requires = "issue_token")]
  subject: Option<String>,

  /// Display name of the issued token.
  #[arg(long, requires = "issue_token")]
  name: Option<String>,

  /// Email of the issued token.
  #[arg(long, requires = "issue_token")]
  email: Option<String>,

  /// Lifetime of the issued token, in hours (at most one year).
  #[arg(
    long,
    default_value_t = 24,
    value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_HOURS),
  )]
  ttl_hours: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  // `.env.local` wins over `.env`; neither overrides the real environment.
  dotenvy::from_filename(".env.local").ok();
  dotenvy::dotenv().ok();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let missing = server_cfg.missing_required();
  if !missing.is_empty() {
    for key in &missing {
      tracing::error!(
        "missing required setting `{key}` (set it in the config file or as ROSTER_{})",
        key.to_uppercase()
      );
    }
    anyhow::bail!("missing required settings: {}", missing.join(", "));
  }

  // Helper mode: mint a token and exit.
  if cli.issue_token {
    let subject = cli.subject.context("--issue-token needs --subject")?;
    let identity = Identity { subject, name: cli.name, email: cli.email };
    let ttl = Duration::try_hours(cli.ttl_hours).context("--ttl-hours is out of range")?;
    let token = server_cfg
      .session_authority()
      .issue(&identity, ttl)
      .context("failed to sign token")?;
    println!("{token}");
    return Ok(());
  }

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = roster_server::router(Arc::new(store), &server_cfg);
  let address = server_cfg.bind_address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
