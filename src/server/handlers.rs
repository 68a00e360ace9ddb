// HTTP request handlers.
// Translate query parameters into feed and gate calls, and results into JSON.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::GlanceError;
use crate::feeds::CacheAges;
use crate::quantize::GraphMode;
use crate::state::AvailabilityState;

use super::AppState;

/// Body returned by every display endpoint.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub state: AvailabilityState,
    /// Seconds since each feed was last fetched.
    pub cache_age_secs: CacheAges,
}

/// `?enabled=` toggle. Only the literal `true` enables; anything else disables.
#[derive(Debug, Deserialize)]
pub struct ToggleQuery {
    pub enabled: Option<String>,
}

impl ToggleQuery {
    fn value(&self) -> Option<bool> {
        self.enabled.as_deref().map(|v| v == "true")
    }
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub mode: GraphMode,
}

impl IntoResponse for GlanceError {
    fn into_response(self) -> Response {
        let status = match &self {
            GlanceError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn content(content: String) -> Json<ContentResponse> {
    Json(ContentResponse { content })
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        state: state.feeds.gate().snapshot(),
        cache_age_secs: state.feeds.cache_ages(),
    })
}

/// GET /display (also served as /hello)
pub async fn get_display(State(state): State<AppState>) -> Json<ContentResponse> {
    content(state.feeds.get_display())
}

/// GET /display/set?text=...
///
/// Without a `text` parameter the stored text is left as is; `text=` clears it.
pub async fn set_display(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Json<ContentResponse> {
    match query.text {
        Some(text) => {
            state.feeds.set_display(&text);
            content(text)
        }
        None => content(state.feeds.get_display()),
    }
}

/// GET /state[?enabled=true|false]
pub async fn toggle_state(
    State(state): State<AppState>,
    Query(query): Query<ToggleQuery>,
) -> Json<AvailabilityState> {
    let current = match query.value() {
        Some(enabled) => state.feeds.set_enabled(enabled),
        None => state.feeds.gate().snapshot(),
    };
    Json(current)
}

/// GET /auto[?enabled=true|false]
pub async fn toggle_auto_mode(
    State(state): State<AppState>,
    Query(query): Query<ToggleQuery>,
) -> Json<AvailabilityState> {
    let current = match query.value() {
        Some(auto_mode) => state.feeds.set_auto_mode(auto_mode),
        None => state.feeds.gate().snapshot(),
    };
    Json(current)
}

/// GET /commits
pub async fn get_commits(
    State(state): State<AppState>,
) -> Result<Json<ContentResponse>, GlanceError> {
    Ok(content(state.feeds.commits_summary().await?))
}

/// GET /weather
pub async fn get_weather(
    State(state): State<AppState>,
) -> Result<Json<ContentResponse>, GlanceError> {
    Ok(content(state.feeds.weather_summary().await?))
}

/// GET /graph[?mode=bitmap|levels]
pub async fn get_graph(
    State(state): State<AppState>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<ContentResponse>, GlanceError> {
    Ok(content(state.feeds.contribution_graph(query.mode).await?))
}
