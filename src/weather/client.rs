// OpenWeatherMap HTTP client.
// Fetches current conditions for one configured location.

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{GlanceError, Result};
use crate::feeds::WeatherSource;
use crate::github::client::REQUEST_TIMEOUT;

use super::types::{CurrentWeather, Units, WeatherResponse};

const WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather API client bound to a location and unit system.
pub struct WeatherClient {
    client: Client,
    api_key: String,
    location: String,
    units: Units,
}

impl WeatherClient {
    pub fn new(api_key: &str, location: &str, units: Units) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("glance"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GlanceError::Api)?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            location: location.to_string(),
            units,
        })
    }

    /// Get current weather for the configured location.
    pub async fn get_current(&self) -> Result<CurrentWeather> {
        let params = [
            ("q", self.location.as_str()),
            ("units", self.units.as_str()),
            ("appid", self.api_key.as_str()),
        ];
        let response = self
            .client
            .get(WEATHER_API_URL)
            .query(&params)
            .send()
            .await
            .map_err(GlanceError::Api)?;

        let status = response.status();
        let body = response.text().await?;

        // Error payloads carry their own `cod`; fall back to the HTTP status
        // when the body is not JSON at all.
        let parsed: WeatherResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(GlanceError::UpstreamStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => return Err(e.into()),
        };

        parsed.into_current(self.units)
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current(&self) -> Result<CurrentWeather> {
        self.get_current().await
    }
}
