//! ShareIt gateway: validates requests and relays valid ones to the server.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use shareit::gateway::GatewayState;

/// Command-line arguments for the ShareIt gateway.
#[derive(Parser, Debug)]
#[command(
    name = "shareit-gateway",
    version,
    about = "Validating gateway for the ShareIt server"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "shareit.example.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the upstream server URL.
    #[arg(long)]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shareit::config::load_config(&cli.config)?;

    shareit::logging::init_logging(&config.logging);
    info!("Loaded configuration from {}", cli.config);

    let bind_addr = cli.bind.unwrap_or_else(|| config.gateway_bind_addr());
    let server_url = cli
        .server_url
        .unwrap_or_else(|| config.gateway.server_url.clone());

    if config.observability.metrics {
        shareit::metrics::init_metrics();
        shareit::metrics::describe_metrics();
    }

    let state = Arc::new(GatewayState::new(config, &server_url)?);
    let app = shareit::gateway::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("ShareIt gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shareit::shutdown_signal())
        .await?;

    info!("ShareIt gateway shut down");

    Ok(())
}
