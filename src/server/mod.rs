//! HTTP surface.
//!
//! | Path | Description |
//! |------|-------------|
//! | `/` | Static UI |
//! | `/stream` | Server-sent event stream, one brewery per frame |
//! | `/health` | Liveness probe |
//! | `/metrics` | Prometheus text format |

mod handlers;

use axum::{Router, routing::get};
use snafu::prelude::*;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::CompressionLevel;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, StreamConfig};
use crate::error::{BindSnafu, ServeSnafu, ServerError};
use crate::upstream::BreweryFetcherRef;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "brewery-stream";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    fetcher: BreweryFetcherRef,
    stream: StreamConfig,
    metrics_enabled: bool,
    shutdown: CancellationToken,
}

impl AppState {
    /// `shutdown` is the root token; every session runs on a child of it.
    pub fn new(
        fetcher: BreweryFetcherRef,
        stream: StreamConfig,
        metrics_enabled: bool,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            stream,
            metrics_enabled,
            shutdown,
        }
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/stream", get(handlers::stream))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // The default predicate never compresses text/event-stream.
        .layer(CompressionLayer::new().quality(CompressionLevel::Precise(5)))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound listener ready to serve.
pub struct Server {
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
}

impl Server {
    /// Bind the configured address.
    ///
    /// This is the only fatal error at startup; everything after it is
    /// handled per request.
    pub async fn bind(
        config: &Config,
        fetcher: BreweryFetcherRef,
        shutdown: CancellationToken,
    ) -> Result<Self, ServerError> {
        let addr = config.server.socket_addr();
        let listener = TcpListener::bind(addr).await.context(BindSnafu { addr })?;

        let state = AppState::new(
            fetcher,
            config.stream.clone(),
            config.metrics.enabled,
            shutdown.clone(),
        );

        Ok(Self {
            listener,
            app: router(state),
            shutdown,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().context(ServeSnafu)
    }

    /// Serve until the shutdown token is cancelled and every open stream
    /// has ended.
    pub async fn run(self) -> Result<(), ServerError> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Brewery stream listening");
        }

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(self.shutdown.cancelled_owned())
            .await
            .context(ServeSnafu)?;

        info!("Server stopped");
        Ok(())
    }
}
