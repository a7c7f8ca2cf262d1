//! ShareIt server: persistence-backed business logic behind a JSON API.
//!
//! Schema creation is idempotent, so every startup runs it. SIGTERM/SIGINT
//! stop accepting connections and let in-flight requests finish.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use shareit::store::repository::ShareItStore;
use shareit::store::sqlite::SqliteStore;

/// Command-line arguments for the ShareIt server.
#[derive(Parser, Debug)]
#[command(name = "shareit-server", version, about = "ShareIt item sharing server")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "shareit.example.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shareit::config::load_config(&cli.config)?;

    shareit::logging::init_logging(&config.logging);
    info!("Loaded configuration from {}", cli.config);

    let bind_addr = cli.bind.unwrap_or_else(|| config.server_bind_addr());

    if config.observability.metrics {
        shareit::metrics::init_metrics();
        shareit::metrics::describe_metrics();
        info!("Prometheus metrics initialized");
    }

    let db_path = &config.store.sqlite.path;
    if db_path != ":memory:" {
        // Ensure parent directory exists for the SQLite file.
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store: Arc<dyn ShareItStore> = Arc::new(SqliteStore::new(db_path)?);
    info!("SQLite store initialized at {}", db_path);

    let state = Arc::new(shareit::AppState {
        config: config.clone(),
        store,
    });

    let app = shareit::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("ShareIt server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shareit::shutdown_signal())
        .await?;

    info!("ShareIt server shut down");

    Ok(())
}
