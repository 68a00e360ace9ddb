// HTTP server built on axum.
// Sets up routes and shared state for the display endpoints.

pub mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::error::{GlanceError, Result};
use crate::feeds::Feeds;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub feeds: Arc<Feeds>,
}

/// Build the router with all display and control routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/hello", get(handlers::get_display))
        .route("/display", get(handlers::get_display))
        .route("/display/set", get(handlers::set_display))
        .route("/state", get(handlers::toggle_state))
        .route("/auto", get(handlers::toggle_auto_mode))
        .route("/commits", get(handlers::get_commits))
        .route("/weather", get(handlers::get_weather))
        .route("/graph", get(handlers::get_graph))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `addr` and serve until the process exits.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GlanceError::Other(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("Server running on {addr}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
