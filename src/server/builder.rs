//! ServerBuilder for fluent API to build HTTP servers

use super::host::AppState;
use super::router::build_api_routes;
use crate::config::{AppConfig, QueryConfig};
use crate::core::service::CustomerStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the CRM HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryCustomerStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn CustomerStore>>,
    query: QueryConfig,
    cors_permissive: bool,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            query: QueryConfig::default(),
            cors_permissive: true,
        }
    }

    /// Set the storage backend (required)
    pub fn with_store(mut self, store: impl CustomerStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a storage backend that is also held elsewhere (e.g. by tests)
    pub fn with_shared_store(mut self, store: Arc<dyn CustomerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Defaults for customer list requests
    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    /// Toggle the permissive CORS layer
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Apply the query and server sections of an [`AppConfig`]
    pub fn with_config(self, config: &AppConfig) -> Self {
        self.with_query_config(config.query)
            .with_cors(config.server.cors_permissive)
    }

    /// Build the state shared by all handlers
    pub fn build_state(&mut self) -> Result<AppState> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("CustomerStore is required. Call .with_store()"))?;

        Ok(AppState::new(store, self.query))
    }

    /// Build the final router with tracing and CORS layers applied
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;

        let mut app = Router::new()
            .nest("/api", build_api_routes(state))
            .layer(TraceLayer::new_for_http());
        if self.cors_permissive {
            app = app.layer(CorsLayer::permissive());
        }

        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for Ctrl+C or SIGTERM
///
/// If a handler cannot be installed that branch never fires; the other one
/// still can.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
