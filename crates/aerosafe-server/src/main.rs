//! aerosafe server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API over HTTP. With
//! `reconcile_interval_secs` set, overdue actions and occurrence statuses
//! are reconciled in the background.

use std::{path::PathBuf, sync::Arc};

use aerosafe_core::Engine;
use aerosafe_server::{ServerConfig, app, expand_tilde, spawn_reconciler};
use aerosafe_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Aerosafe safety-management server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run one reconciliation pass, print the summary and exit.
  #[arg(long)]
  reconcile_once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("AEROSAFE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let engine = Arc::new(Engine::with_system_clock(store));

  if cli.reconcile_once {
    let summary = engine.reconcile().await.context("reconciliation failed")?;
    println!(
      "overdue: {}, cleared: {}, occurrences repaired: {}",
      summary.actions_marked_overdue, summary.actions_cleared, summary.occurrences_repaired
    );
    return Ok(());
  }

  if let Some(every) = server_cfg.reconcile_interval() {
    tracing::info!(interval_secs = every.as_secs(), "scheduled reconciliation enabled");
    spawn_reconciler(Arc::clone(&engine), every);
  }

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(engine)).await.context("server error")?;

  Ok(())
}
