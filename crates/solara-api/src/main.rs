//! Server entrypoint.
//!
//! Loads configuration from the environment, wires the storage
//! collaborators (Postgres when `DATABASE_URL` is set, in-memory records
//! with a filesystem blob root otherwise), and serves the router.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use solara_api::{app, AppConfig, AppState};
use solara_kyc::{
    FsBlobStore, InMemoryAuditLog, InMemoryDocumentStore, PgAuditLog, PgDocumentStore,
};

/// Document management and identity-verification service.
#[derive(Parser, Debug)]
#[command(name = "solara-api", version, about)]
struct Args {
    /// Bind host, overriding `SOLARA_HOST`.
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding `SOLARA_PORT`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let blobs = Arc::new(FsBlobStore::new(&config.storage.blob_root));
    let state = match &config.storage.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("connecting to postgres")?;
            tracing::info!("document records backed by postgres");
            AppState::assemble(
                Arc::new(PgDocumentStore::new(pool.clone())),
                blobs,
                Arc::new(PgAuditLog::new(pool)),
                config.limits,
                config.fetch_timeout,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; document records are in-memory");
            AppState::assemble(
                Arc::new(InMemoryDocumentStore::new()),
                blobs,
                Arc::new(InMemoryAuditLog::new()),
                config.limits,
                config.fetch_timeout,
            )
        }
    };

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "document service listening");
    axum::serve(listener, app(state))
        .await
        .context("server terminated")?;
    Ok(())
}
