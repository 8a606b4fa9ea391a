//! # ipadhad — iPadHA daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`ipadha.toml` plus environment overrides)
//! - Initialise `tracing` with the configured filter
//! - Construct the hub adapters (REST client, WebSocket push transport)
//! - Construct the interaction engine and start state synchronisation
//! - Build the axum router over the engine's hub, cache and event bus
//! - Bind to a TCP port, serve, and shut down on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no interaction logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use ipadha_adapter_http_axum::router;
use ipadha_adapter_http_axum::state::AppState;
use ipadha_adapter_hub_rest::RestHubClient;
use ipadha_adapter_hub_websocket::WebSocketPushTransport;
use ipadha_app::engine::Engine;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Hub adapters
    let hub = RestHubClient::new(&config.hub).context("failed to build hub client")?;
    let push = WebSocketPushTransport::new(&config.hub.url, config.hub.token.clone())
        .context("failed to build hub websocket transport")?;
    if config.hub.token.is_empty() {
        tracing::warn!("no hub access token configured, requests will be rejected");
    }

    // Engine
    let engine = Engine::new(hub, push, config.engine_config());
    let sync = engine.start();

    // HTTP
    let state = AppState::from_arcs(
        Arc::clone(engine.hub()),
        Arc::new(engine.clone()),
        engine.events(),
    );
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(
        %bind_addr,
        hub = %config.hub.url,
        push = config.sync.use_websocket,
        "ipadhad listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    sync.abort();
    tracing::info!("ipadhad stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
