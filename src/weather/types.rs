// Weather API response types.
// Shapes of the OpenWeatherMap current-weather payload and the values derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GlanceError, Result};

/// Unit system requested from the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    /// Letter shown after the temperature.
    pub fn letter(&self) -> char {
        match self {
            Units::Imperial => 'F',
            _ => 'C',
        }
    }
}

impl FromStr for Units {
    type Err = GlanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            other => Err(GlanceError::Other(format!("unknown unit system: {}", other))),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions at the configured location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub temperature: f64,
    /// OpenWeatherMap condition id (e.g. 800 for clear sky).
    pub condition_code: u16,
    pub units: Units,
}

/// Status code echoed in the payload. Numeric on success, a string on most errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PayloadCode {
    Number(u16),
    Text(String),
}

impl PayloadCode {
    pub fn value(&self) -> Option<u16> {
        match self {
            PayloadCode::Number(n) => Some(*n),
            PayloadCode::Text(s) => s.parse().ok(),
        }
    }
}

/// Raw current-weather response.
#[derive(Debug, Deserialize)]
pub struct WeatherResponse {
    pub cod: Option<PayloadCode>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub id: u16,
}

impl WeatherResponse {
    /// Validate the payload and extract the fields the display needs.
    pub fn into_current(self, units: Units) -> Result<CurrentWeather> {
        let code = self.cod.as_ref().and_then(PayloadCode::value);
        if code != Some(200) {
            return Err(GlanceError::UpstreamStatus {
                status: code.unwrap_or(0),
                body: self.message.unwrap_or_default(),
            });
        }

        let city = self
            .name
            .ok_or_else(|| GlanceError::UpstreamDataInvalid("missing name".into()))?;
        let temperature = self
            .main
            .map(|main| main.temp)
            .ok_or_else(|| GlanceError::UpstreamDataInvalid("missing main.temp".into()))?;
        let condition_code = self
            .weather
            .first()
            .map(|condition| condition.id)
            .ok_or_else(|| GlanceError::UpstreamDataInvalid("missing weather[0].id".into()))?;

        Ok(CurrentWeather {
            city,
            temperature,
            condition_code,
            units,
        })
    }
}
