//! # who-web
//!
//! Pull-based metrics endpoint.
//! Axum server exposing the session metric store at `GET /metrics`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;
use who_core::config::WebConfig;

pub use store::SessionMetricStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Last published cycle
    pub store: Arc<SessionMetricStore>,
}

/// Build the exporter router
pub fn router(store: Arc<SessionMetricStore>) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

/// Metrics HTTP server
pub struct MetricsServer {
    config: WebConfig,
    state: AppState,
}

impl MetricsServer {
    /// New server over `store`
    pub fn new(store: Arc<SessionMetricStore>, config: WebConfig) -> Self {
        Self {
            config,
            state: AppState { store },
        }
    }

    /// Bind the configured `host:port`.
    ///
    /// There is no fallback port; callers treat an error here as fatal.
    pub async fn bind(&self) -> Result<TcpListener, std::io::Error> {
        let listener =
            TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!(
            "metrics endpoint listening on http://{}{}",
            listener.local_addr()?,
            routes::METRICS_PATH
        );
        Ok(listener)
    }

    /// Serve requests on `listener` until `shutdown_rx` turns true
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let app = router(self.state.store);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                loop {
                    if *shutdown_rx.borrow() {
                        info!("metrics server received shutdown signal");
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        info!("metrics server stopped");
        Ok(())
    }

    /// Scrape URL
    pub fn url(&self) -> String {
        format!(
            "http://{}{}",
            self.config.listen_addr(),
            routes::METRICS_PATH
        )
    }
}
