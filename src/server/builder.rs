//! ServerBuilder for fluent API to build the HTTP server

use super::host::ServerHost;
use super::router::build_routes;
use crate::config::AppConfig;
use crate::core::{ExpenseStore, NotificationSink, UpstreamClient};
use crate::notify::DiscordWebhook;
use crate::sync::{ExpenseSync, SyncOptions};
use crate::upstream::SplitwiseClient;
use anyhow::Result;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the HTTP server
///
/// The store is required. The upstream client and the sink default to the
/// Splitwise client and the Discord webhook built from the configuration.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .with_store(InMemoryExpenseStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn ExpenseStore>>,
    upstream: Option<Arc<dyn UpstreamClient>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            upstream: None,
            sink: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the expense store (required)
    pub fn with_store(mut self, store: impl ExpenseStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared expense store (required)
    pub fn with_shared_store(mut self, store: Arc<dyn ExpenseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the default Splitwise client
    pub fn with_upstream(mut self, upstream: impl UpstreamClient + 'static) -> Self {
        self.upstream = Some(Arc::new(upstream));
        self
    }

    /// Replace the default Discord webhook sink
    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the shared host
    pub fn build_host(mut self) -> Result<ServerHost> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("ExpenseStore is required. Call .with_store()"))?;

        let upstream: Arc<dyn UpstreamClient> = match self.upstream.take() {
            Some(upstream) => upstream,
            None => Arc::new(SplitwiseClient::new(&self.config.upstream)?),
        };

        let sink: Arc<dyn NotificationSink> = match self.sink.take() {
            Some(sink) => sink,
            None => Arc::new(DiscordWebhook::new(&self.config.notify)?),
        };

        let options = SyncOptions {
            page_size: self.config.sync.page_size,
            dashboard_url: self.config.notify.dashboard_url.clone(),
        };

        let sync = ExpenseSync::new(upstream, store, sink, options);
        Ok(ServerHost::new(self.config, sync))
    }

    /// Build the router
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        Ok(build_routes(host))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `server.bind` and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn serve_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = self.config.server.bind.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
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

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
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
