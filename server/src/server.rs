//! Server setup and lifecycle for Orion.

use config::OrionConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt
};

use crate::error::ServerError;
use crate::routes::create_router;
use crate::state::AppState;

/// The Orion HTTP server.
pub struct OrionServer {
    state: Arc<AppState>
}

impl OrionServer {
    /// Creates a server backed by the production providers. Refuses to start
    /// without the session secrets.
    pub fn new(config: OrionConfig) -> Result<Self, ServerError> {
        let missing = config.missing_secrets();
        if !missing.is_empty() {
            return Err(ServerError::MissingSecrets { missing });
        }

        let mut state = AppState::from_config(config)?;
        if state.config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| ServerError::Metrics(e.to_string()))?;
            state = state.with_metrics(handle);
            tracing::info!("Prometheus recorder installed");
        }

        Ok(Self::with_state(Arc::new(state)))
    }

    /// Creates a server instance from an existing `AppState`.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Runs the HTTP server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        let server = &self.state.config.server;
        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{}:{}: {e}", server.host, server.port)))?;

        let router = create_router(self.state.clone());
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "Orion server starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Orion server stopped");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

/// Signal handler for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

/// `RUST_LOG` wins; otherwise the configured level.
fn env_filter(config: &OrionConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level))
}

/// Filter used while configuration is still loading: `RUST_LOG`, then
/// `ORION_LOG_LEVEL`, then `info`.
fn bootstrap_filter<F>(lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>
{
    lookup(EnvFilter::DEFAULT_ENV)
        .or_else(|| lookup("ORION_LOG_LEVEL"))
        .filter(|directive| !directive.trim().is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Installs the global subscriber. The returned handle swaps in the
/// configured filter once configuration is loaded.
fn init_tracing() -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(bootstrap_filter(|key| std::env::var(key).ok()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    handle
}

/// Entry point for running the server from configuration.
pub async fn run_server(config: OrionConfig) -> Result<(), ServerError> {
    let server = OrionServer::new(config)?;
    server.run().await
}

/// Entry point for running the server from environment variables and the
/// optional `ORION_CONFIG` file.
pub async fn run_from_env() -> Result<(), ServerError> {
    let filter = init_tracing();
    let config = config::load_config()?;

    if let Err(e) = filter.reload(env_filter(&config)) {
        tracing::warn!(error = %e, "Failed to apply configured log level");
    }

    run_server(config).await
}
