//! Cambio Server Binary
//!
//! Currency conversion API service backed by AwesomeAPI quotes.

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cambio_rates::CurrencyCode;
use cambio_server::config::ServerConfig;

/// Cambio currency conversion server CLI
#[derive(Parser, Debug)]
#[command(name = "cambio", version)]
#[command(about = "Currency conversion API service")]
struct Args {
    /// Path segment the API is served under; blank serves it at the root
    #[arg(long, default_value = "cambio")]
    app_name: String,

    /// Base URL of the AwesomeAPI quote service
    #[arg(long, default_value = "https://economia.awesomeapi.com.br")]
    awesome_api: String,

    /// Currency every cached rate is expressed in
    #[arg(long, default_value = "USD")]
    reference: String,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    listen_addr: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Set SO_REUSEADDR on the listening socket
    #[arg(long)]
    reuse_address: bool,

    /// Seconds between rate refresh cycles
    #[arg(long, default_value = "300")]
    refresh_interval: u64,

    /// Default log filter; RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig {
        app_name: args.app_name,
        awesome_api_url: args.awesome_api,
        reference: CurrencyCode::new(args.reference),
        listen_addr: args.listen_addr,
        port: args.port,
        reuse_address: args.reuse_address,
        refresh_interval: Duration::from_secs(args.refresh_interval),
    };

    info!(
        reference = %config.reference,
        refresh_interval_secs = config.refresh_interval.as_secs(),
        "Starting cambio server"
    );

    cambio_server::run(config).await
}
