use crate::config::RelayConfig;
use crate::room::{RegistryHandle, RegistryStats};
use crate::signaling::SignalingRelay;
use crate::transport::ws_handler;
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared state handed to every connection handler.
#[derive(Clone)]
pub struct RelayState {
    pub relay: SignalingRelay,
    pub config: Arc<RelayConfig>,
}

impl RelayState {
    /// Spawns the registry actor, so this must run inside a tokio runtime.
    pub fn new(config: RelayConfig) -> Self {
        let registry = RegistryHandle::spawn(config.registry_capacity);
        Self {
            relay: SignalingRelay::new(registry),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    #[serde(flatten)]
    stats: Option<RegistryStats>,
}

async fn health(State(state): State<RelayState>) -> Json<HealthReport> {
    match state.relay.registry().stats().await {
        Ok(stats) => Json(HealthReport {
            status: "ok",
            stats: Some(stats),
        }),
        Err(e) => {
            error!("Health check failed: {}", e);
            Json(HealthReport {
                status: "unavailable",
                stats: None,
            })
        }
    }
}

/// Bind `config.bind:config.port` and relay until `shutdown` resolves.
pub async fn serve<F>(config: RelayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind relay on {}", addr))?;
    serve_with_listener(listener, config, shutdown).await
}

pub async fn serve_with_listener<F>(listener: TcpListener, config: RelayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    let state = RelayState::new(config);

    info!("Signaling relay listening on {}", local_addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Relay server stopped with an error")?;
    info!("Signaling relay on {} shut down", local_addr);
    Ok(())
}
