// glance: HTTP feed server for a low-resolution remote display.
// Wires configuration, upstream clients, the availability gate, and the HTTP routes.

mod cache;
mod config;
mod error;
mod feeds;
mod github;
mod quantize;
mod server;
mod state;
mod storage;
mod weather;

use std::sync::Arc;

use config::Config;
use error::Result;
use feeds::{ContributionSource, Feeds, WeatherSource};
use github::GitHubClient;
use server::AppState;
use state::{Gate, TICK_INTERVAL};
use storage::DisplayStore;
use weather::WeatherClient;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "glance exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    let contributions: Option<Arc<dyn ContributionSource>> = match &config.github {
        Some(gh) => {
            let client: Arc<dyn ContributionSource> =
                Arc::new(GitHubClient::new(&gh.token, &gh.username)?);
            Some(client)
        }
        None => {
            tracing::warn!("GITHUB_TOKEN or GITHUB_USERNAME not set, commit and graph feeds disabled");
            None
        }
    };

    let weather: Option<Arc<dyn WeatherSource>> = match &config.weather {
        Some(w) => {
            let client: Arc<dyn WeatherSource> =
                Arc::new(WeatherClient::new(&w.api_key, &w.location, w.units)?);
            Some(client)
        }
        None => {
            tracing::warn!("WEATHER_API_KEY or WEATHER_LOCATION not set, weather feed disabled");
            None
        }
    };

    let gate = Arc::new(if config.auto_mode {
        Gate::with_auto_mode()
    } else {
        Gate::new()
    });
    let _ticker = state::spawn_ticker(gate.clone(), TICK_INTERVAL);

    let store = DisplayStore::new(&config.state_file);
    tracing::info!(path = %store.path().display(), "display text store");

    let feeds = Arc::new(Feeds::new(gate, store, contributions, weather));
    server::serve(&config.bind_addr(), AppState { feeds }).await
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("glance=info,tower_http=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
