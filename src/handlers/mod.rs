//! Shared application state and the observability HTTP listener
//!
//! The listener is optional and only serves `/health` and `/metrics`; the
//! tools themselves are exposed over stdio (see [`crate::tools`]).

use crate::config::Config;
use crate::daemon::DaemonClient;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::profiles::ProfileStore;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod metrics;

/// Application state shared by tools, CLI commands and HTTP handlers
///
/// All fields are Arc'd for cheap cloning into spawned tool tasks.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: Arc<DaemonClient>,
    metrics: Arc<Metrics>,
    profiles: Option<Arc<ProfileStore>>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// # Errors
    /// Fails if the daemon client or the metrics registry cannot be built.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let client = Arc::new(DaemonClient::new(&config.daemon)?);
        let metrics = Arc::new(
            Metrics::new()
                .map_err(|e| AppError::Internal(format!("Failed to create metrics: {}", e)))?,
        );

        let profiles = ProfileStore::from_config(&config.profiles).map(Arc::new);

        Ok(Self {
            config,
            client,
            metrics,
            profiles,
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the shared daemon client
    pub fn client(&self) -> &Arc<DaemonClient> {
        &self.client
    }

    /// Get reference to the metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Profile store, when `profiles.dir` is configured
    pub fn profiles(&self) -> Option<&ProfileStore> {
        self.profiles.as_deref()
    }
}

/// Build the observability router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `/health` and `/metrics` on `addr` until the process exits
pub async fn serve(state: AppState, addr: SocketAddr) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Observability listener on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| AppError::Internal(format!("Observability listener failed: {}", e)))
}
