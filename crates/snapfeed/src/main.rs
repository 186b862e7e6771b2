//! Snapfeed - image-sharing feed with session-cookie authentication

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use snapfeed_api::{AppState, create_router, routes::describe_metrics};
use snapfeed_auth::TokenCodec;
use snapfeed_db::Database;
use snapfeed_storage::LocalImageStore;

/// Snapfeed - image-sharing feed server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "SNAPFEED_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SNAPFEED_PORT")]
    port: Option<u16>,

    /// Session token signing secret
    #[arg(long, env = "SNAPFEED_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    init_logging(&config.logging.level, &config.logging.format);
    config.validate()?;

    info!("Starting Snapfeed v{}", env!("CARGO_PKG_VERSION"));

    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;

    let images = Arc::new(
        LocalImageStore::new(&config.storage.uploads_path)
            .await
            .context("Failed to initialize image storage")?,
    );

    let tokens = Arc::new(TokenCodec::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    ));

    let state = AppState::new(
        db.clone(),
        tokens,
        images,
        config.storage.max_upload_bytes,
    );

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        describe_metrics();
        Some(Arc::new(handle))
    } else {
        None
    };

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Initialize logging; `RUST_LOG` takes precedence over the configured level
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
