// Weather API module.
// Client and types for the OpenWeatherMap current-weather endpoint.

pub mod client;
pub mod types;

pub use client::WeatherClient;
pub use types::{CurrentWeather, Units};
