//! finproxy HTTP server.

use std::time::Duration;

use anyhow::Context;
use finproxy_server::logging::init_logging;
use finproxy_server::{AppState, ServerConfig, build_service, create_router, shutdown_signal};
use tracing::info;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();

    let config = ServerConfig::from_env().context("loading configuration")?;
    let addr = config.socket_addr()?;
    info!(?config, "Starting finproxy server");

    let client = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .context("building HTTP client")?;
    let service = build_service(&config, &client).context("opening cache store")?;

    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
