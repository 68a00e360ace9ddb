// Error types for glance.
// Covers upstream API failures, missing configuration, and persistence errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlanceError {
    #[error("Feed not configured: missing {0}")]
    ConfigurationMissing(&'static str),

    #[error("Upstream request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Upstream data invalid: {0}")]
    UpstreamDataInvalid(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl GlanceError {
    /// Whether the error came from talking to an upstream service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GlanceError::Api(_)
                | GlanceError::Unauthorized
                | GlanceError::RateLimited { .. }
                | GlanceError::UpstreamStatus { .. }
                | GlanceError::UpstreamDataInvalid(_)
                | GlanceError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GlanceError>;
