//! Cambio Server
//!
//! Wires the rate engine to its process collaborators: the AwesomeAPI quote
//! client, the HTTP API, and the configuration surface.

pub mod api;
pub mod awesome;
pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::info;

use cambio_rates::{ConversionService, RateTableBuilder, Refresher};

use crate::awesome::AwesomeApiClient;
use crate::config::ServerConfig;

/// Run the service until a shutdown signal arrives.
///
/// The listener accepts connections immediately; requests are answered with a
/// `503 loading` body until the first refresh cycle installs a rate table.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|reason| anyhow::anyhow!("invalid configuration: {reason}"))?;

    let provider = Arc::new(AwesomeApiClient::new(&config.awesome_api_url)?);
    let service = Arc::new(ConversionService::new());
    let builder = RateTableBuilder::new(config.reference.clone(), provider);
    let refresher = Refresher::new(builder, service.clone(), config.refresh_interval);
    let refresher_handle = refresher.spawn();

    let app = api::app(service, &config.base_path());
    let listener = bind_listener(&config)?;
    info!(
        addr = %listener.local_addr()?,
        base_path = %config.base_path(),
        reference = %config.reference,
        "api server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher_handle.shutdown().await;
    info!("server stopped");
    Ok(())
}

fn bind_listener(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.listen_addr, config.port
            )
        })?;

    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    if config.reuse_address {
        socket.set_reuseaddr(true)?;
    }
    socket.bind(addr)?;

    Ok(socket.listen(1024)?)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received");
}
