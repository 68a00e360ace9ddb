// GitHub API HTTP client.
// Handles authentication, rate limiting, and GraphQL request/response processing.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{GlanceError, Result};

use super::types::{GraphQlResponse, RateLimit};

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Upper bound on a single upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

/// GitHub API client with authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    username: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a new GitHub client for `username`, authenticated with `token`.
    pub fn new(token: &str, username: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("bearer {}", token))
                .map_err(|e| GlanceError::Other(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("glance"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GlanceError::Api)?;

        Ok(Self {
            client,
            username: username.to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Login whose contributions are reported.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Snapshot of the last seen rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|rl| rl.clone())
            .unwrap_or_default()
    }

    /// Run a GraphQL query and return its `data` payload.
    pub async fn graphql<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<T> {
        let response = self
            .client
            .post(GITHUB_GRAPHQL_URL)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(GlanceError::Api)?;

        self.update_rate_limit(&response);
        let response = self.check_response(response).await?;
        let body: GraphQlResponse<T> = response.json().await?;

        if let Some(error) = body.errors.first() {
            return Err(GlanceError::UpstreamDataInvalid(error.message.clone()));
        }
        body.data
            .ok_or_else(|| GlanceError::UpstreamDataInvalid("response has no data".into()))
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
        tracing::debug!(
            remaining = rate_limit.remaining,
            limit = rate_limit.limit,
            "github rate limit"
        );
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(GlanceError::Unauthorized),
            StatusCode::FORBIDDEN if self.rate_limit().remaining == 0 => {
                let reset_at = chrono::DateTime::from_timestamp(self.rate_limit().reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(GlanceError::RateLimited { reset_at })
            }
            status => Err(GlanceError::UpstreamStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
