//! HTTP server setup and routing
//!
//! Exposes the summarization pipeline over HTTP:
//! - `GET /` liveness payload
//! - `POST /summarize` with `{"videoId": "..."}`

mod handlers;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::pipeline::Pipeline;

pub use handlers::{ApiError, SummarizeRequest, SummarizeResponse};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub pipeline: Arc<Pipeline>,
}

/// Build the router with every route and middleware layer.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(handlers::liveness))
        .route("/summarize", post(handlers::summarize))
        .fallback(handlers::not_found)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until Ctrl-C.
pub async fn run(settings: &Settings, pipeline: Pipeline) -> Result<()> {
    let ctx = AppContext {
        pipeline: Arc::new(pipeline),
    };

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Starting tubenotes server on http://{}", addr);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
