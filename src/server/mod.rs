pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use tracing::info;

use crate::channel::{Endpoints, Registry, resolver::http_client};

/**
    Shared state of the redirect proxy.

    Each request is served independently; the registry is the only shared
    data and it is immutable, so no locking is involved.
*/
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub endpoints: Arc<Endpoints>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(
        registry: Arc<Registry>,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            registry,
            endpoints: Arc::new(endpoints),
            client: http_client(timeout)?,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(routes::redirect)).with_state(state)
}

/// Run the redirect proxy until ctrl-c.
pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("redirect proxy listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
