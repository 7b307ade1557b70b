//! Propdesk - a real-estate CRM backend

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use propdesk_api::{AppState, create_router};
use propdesk_auth::SessionKeys;
use propdesk_db::Database;

/// Propdesk - real-estate CRM backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "PROPDESK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PROPDESK_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting Propdesk v{}", env!("CARGO_PKG_VERSION"));

    // Create the data directory for the SQLite file
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Initialize session keys
    let keys = Arc::new(SessionKeys::new(config.auth.session_secret.as_deref()));
    if !keys.is_configured() {
        // Boot anyway: GET /api/auth/diagnose reports this as a critical
        // issue, which beats refusing to start with no diagnostics at all.
        warn!("Session secret is not configured; logins will fail until it is set");
    }

    // Initialize Prometheus metrics recorder
    let metrics_handle = Arc::new(PrometheusBuilder::new().install_recorder()?);

    // Create application state
    let state = AppState::new(db, keys, config.auth.cookie_secure);

    // Create router
    let app = create_router(state, Some(metrics_handle)).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
