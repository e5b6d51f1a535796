//! quire-server binary.
//!
//! Reads `quire.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the JSON API over HTTP.
//!
//! # Provisioning the first admin
//!
//! A new organization has no members, and creating one over HTTP needs an
//! admin of that organization. Create the first one out of band:
//!
//! ```text
//! cargo run -p quire-server -- bootstrap-admin --org <id> --email a@b.c --name Admin
//! ```

mod bootstrap;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use quire_api::{ServiceInfo, api_router};
use quire_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{bootstrap::BootstrapArgs, settings::ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Quire multi-tenant notes server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "quire.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create a member of an organization directly in the store and exit.
  BootstrapAdmin(BootstrapArgs),
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

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(server_cfg, store).await,
    Command::BootstrapAdmin(args) => bootstrap::run(&store, args).await,
  }
}

async fn serve(server_cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let info = ServiceInfo {
    app_name:    server_cfg.app_name.clone(),
    version:     env!("CARGO_PKG_VERSION").to_string(),
    environment: server_cfg.environment.clone(),
  };
  let app = api_router(Arc::new(store), info, &server_cfg.allowed_origins);
  let address = server_cfg.address();

  tracing::info!(
    environment = %server_cfg.environment,
    store = %server_cfg.store_path.display(),
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
