// Process configuration.
// Reads deployment parameters and upstream credentials from the environment.

use std::path::PathBuf;

use crate::error::{GlanceError, Result};
use crate::storage::paths;
use crate::weather::Units;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Credentials for the GitHub contribution feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    pub token: String,
    pub username: String,
}

/// Credentials and location for the weather feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    pub api_key: String,
    pub location: String,
    pub units: Units,
}

/// Everything the server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` when `GITHUB_TOKEN` or `GITHUB_USERNAME` is unset.
    pub github: Option<GitHubConfig>,
    /// `None` when `WEATHER_API_KEY` or `WEATHER_LOCATION` is unset.
    pub weather: Option<WeatherConfig>,
    /// File holding the persisted display text.
    pub state_file: PathBuf,
    /// Start with the hourly schedule driving visibility.
    pub auto_mode: bool,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| GlanceError::Other(format!("invalid PORT: {}", port)))?,
            None => DEFAULT_PORT,
        };

        let github = match (var("GITHUB_TOKEN"), var("GITHUB_USERNAME")) {
            (Some(token), Some(username)) => Some(GitHubConfig { token, username }),
            _ => None,
        };

        let weather = match (var("WEATHER_API_KEY"), var("WEATHER_LOCATION")) {
            (Some(api_key), Some(location)) => Some(WeatherConfig {
                api_key,
                location,
                units: var("WEATHER_UNITS")
                    .map(|units| units.parse::<Units>())
                    .transpose()?
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        let state_file = match var("GLANCE_STATE_FILE") {
            Some(path) => PathBuf::from(path),
            None => paths::display_path()
                .ok_or(GlanceError::ConfigurationMissing("GLANCE_STATE_FILE"))?,
        };

        let auto_mode = var("GLANCE_AUTO_MODE").is_some_and(|v| v.trim() == "true");

        Ok(Self {
            host,
            port,
            github,
            weather,
            state_file,
            auto_mode,
        })
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("GLANCE_STATE_FILE", "/tmp/glance.json")]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.github.is_none());
        assert!(config.weather.is_none());
        assert!(!config.auto_mode);
        assert_eq!(config.state_file, PathBuf::from("/tmp/glance.json"));
    }

    #[test]
    fn test_full_config() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("GITHUB_USERNAME", "octocat"),
            ("WEATHER_API_KEY", "k"),
            ("WEATHER_LOCATION", "Berlin,DE"),
            ("WEATHER_UNITS", "imperial"),
            ("GLANCE_STATE_FILE", "/tmp/glance.json"),
            ("GLANCE_AUTO_MODE", "true"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(
            config.github,
            Some(GitHubConfig {
                token: "ghp_x".into(),
                username: "octocat".into()
            })
        );
        assert_eq!(config.weather.unwrap().units, Units::Imperial);
        assert!(config.auto_mode);
    }

    #[test]
    fn test_partial_credentials_disable_feed() {
        let config = load(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("WEATHER_API_KEY", "k"),
            ("WEATHER_LOCATION", "  "),
            ("GLANCE_STATE_FILE", "/tmp/glance.json"),
        ])
        .unwrap();

        assert!(config.github.is_none());
        assert!(config.weather.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("PORT", "eighty"), ("GLANCE_STATE_FILE", "/tmp/g.json")]).is_err());
        assert!(
            load(&[
                ("WEATHER_API_KEY", "k"),
                ("WEATHER_LOCATION", "Berlin"),
                ("WEATHER_UNITS", "kelvin"),
                ("GLANCE_STATE_FILE", "/tmp/g.json"),
            ])
            .is_err()
        );
    }
}
