//! sano-server - variant ingestion service
//!
//! Registers individuals, ingests variant batch files and serves stored
//! records over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sano_common::config::{resolve_config_path, TomlConfig};
use sano_common::db::init_database;
use sano_common::{IdentityRegistry, VariantStore};
use sano_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sano-server
#[derive(Parser, Debug)]
#[command(name = "sano-server")]
#[command(about = "Genomic variant ingestion and query service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(short, long, env = "SANO_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long, env = "SANO_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SANO_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration is read before tracing init so the log level applies
    let config_path = resolve_config_path(args.config.as_deref());
    let config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "sano_common={0},sano_server={0},tower_http={0}",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sano-server v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if path.exists() => info!("Configuration file: {}", path.display()),
        Some(path) => warn!(
            "Configuration file {} not found, using built-in defaults",
            path.display()
        ),
        None => info!("No configuration file, using built-in defaults"),
    }

    let db_path = args.database.unwrap_or(config.database.path);
    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);

    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let policy = config.registry.duplicate_labels;
    info!("Duplicate individual labels: {:?}", policy);

    let store = VariantStore::new(IdentityRegistry::new(pool.clone(), policy));
    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    info!("sano-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
