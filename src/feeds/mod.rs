// Feed aggregation.
// Combines the availability gate, per-feed caches, and formatters into display content.

pub mod format;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::cache::FeedCache;
use crate::error::{GlanceError, Result};
use crate::github::{self, CommitActivity, ContributionSeries};
use crate::quantize::{self, GraphMode};
use crate::state::{AvailabilityState, Gate};
use crate::storage::DisplayStore;
use crate::weather::CurrentWeather;

/// Freshness window for today's commit activity.
pub const COMMITS_TTL: Duration = Duration::from_secs(5 * 60);
/// Freshness window for current weather.
pub const WEATHER_TTL: Duration = Duration::from_secs(15 * 60);
/// Freshness window for the contribution calendar.
pub const CALENDAR_TTL: Duration = Duration::from_secs(30 * 60);

/// Upstream source of commit activity and contribution history.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// Commits made since `from` (normally local midnight).
    async fn commits_since(&self, from: DateTime<Utc>) -> Result<CommitActivity>;

    /// Daily contribution counts for roughly the last year.
    async fn contribution_calendar(&self) -> Result<ContributionSeries>;
}

/// Upstream source of current weather.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> Result<CurrentWeather>;
}

/// Age of each cache entry in seconds, for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CacheAges {
    pub commits: Option<u64>,
    pub weather: Option<u64>,
    pub calendar: Option<u64>,
}

/// Per-process owner of everything the display endpoints serve.
pub struct Feeds {
    gate: Arc<Gate>,
    store: DisplayStore,
    display_text: Mutex<String>,
    contributions: Option<Arc<dyn ContributionSource>>,
    weather: Option<Arc<dyn WeatherSource>>,
    commits_cache: FeedCache<CommitActivity>,
    weather_cache: FeedCache<CurrentWeather>,
    calendar_cache: FeedCache<ContributionSeries>,
}

impl Feeds {
    /// Build the aggregator, loading the persisted display text from `store`.
    ///
    /// A `None` source makes its feeds report missing configuration.
    pub fn new(
        gate: Arc<Gate>,
        store: DisplayStore,
        contributions: Option<Arc<dyn ContributionSource>>,
        weather: Option<Arc<dyn WeatherSource>>,
    ) -> Self {
        let display_text = store.load();
        Self {
            gate,
            store,
            display_text: Mutex::new(display_text),
            contributions,
            weather,
            commits_cache: FeedCache::new("commits", COMMITS_TTL),
            weather_cache: FeedCache::new("weather", WEATHER_TTL),
            calendar_cache: FeedCache::new("calendar", CALENDAR_TTL),
        }
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Current display text, or empty while output is disabled.
    pub fn get_display(&self) -> String {
        if !self.gate.is_enabled() {
            return String::new();
        }
        self.text().clone()
    }

    /// Replace the display text and persist it.
    pub fn set_display(&self, text: &str) {
        *self.text() = text.to_string();
        self.store.save(text);
        tracing::info!(len = text.len(), "display text updated");
    }

    fn text(&self) -> MutexGuard<'_, String> {
        self.display_text.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_enabled(&self, enabled: bool) -> AvailabilityState {
        self.gate.set_enabled(enabled)
    }

    pub fn set_auto_mode(&self, auto_mode: bool) -> AvailabilityState {
        self.gate.set_auto_mode(auto_mode)
    }

    /// `"Today: {n} commit(s) (...)"`, or empty while output is disabled.
    pub async fn commits_summary(&self) -> Result<String> {
        if !self.gate.is_enabled() {
            return Ok(String::new());
        }
        let source = self
            .contributions
            .as_ref()
            .ok_or(GlanceError::ConfigurationMissing("GITHUB_TOKEN and GITHUB_USERNAME"))?;

        let activity = self
            .commits_cache
            .get_or_fetch(|| source.commits_since(start_of_local_day()))
            .await?;
        Ok(format::commit_summary(&activity))
    }

    /// `"{city}: {temp}{unit} {condition}"`, or empty while output is disabled.
    pub async fn weather_summary(&self) -> Result<String> {
        if !self.gate.is_enabled() {
            return Ok(String::new());
        }
        let source = self
            .weather
            .as_ref()
            .ok_or(GlanceError::ConfigurationMissing("WEATHER_API_KEY and WEATHER_LOCATION"))?;

        let weather = self.weather_cache.get_or_fetch(|| source.current()).await?;
        Ok(format::weather_summary(&weather))
    }

    /// Contribution graph rendered with `mode`, or empty while output is disabled.
    pub async fn contribution_graph(&self, mode: GraphMode) -> Result<String> {
        if !self.gate.is_enabled() {
            return Ok(String::new());
        }
        let source = self
            .contributions
            .as_ref()
            .ok_or(GlanceError::ConfigurationMissing("GITHUB_TOKEN and GITHUB_USERNAME"))?;

        let series = self
            .calendar_cache
            .get_or_fetch(|| source.contribution_calendar())
            .await?;
        Ok(quantize::render(&github::counts(&series), mode))
    }

    /// Ages of the cached upstream responses.
    pub fn cache_ages(&self) -> CacheAges {
        CacheAges {
            commits: self.commits_cache.age().map(|d| d.as_secs()),
            weather: self.weather_cache.age().map(|d| d.as_secs()),
            calendar: self.calendar_cache.age().map(|d| d.as_secs()),
        }
    }
}

/// Quarter hours searched past midnight for the first local time that exists.
const DAY_START_SEARCH_STEPS: i64 = 4 * 4;

/// Start of today in local time, in UTC.
pub fn start_of_local_day() -> DateTime<Utc> {
    let now = Local::now();
    first_instant_of_day(now.date_naive(), |t| Local.from_local_datetime(&t))
        .unwrap_or(now)
        .with_timezone(&Utc)
}

/// Midnight of `date`, or the first valid local time after it when midnight
/// falls in a DST gap. An ambiguous midnight resolves to the earlier instant.
fn first_instant_of_day<Tz, F>(date: NaiveDate, resolve: F) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
    F: Fn(NaiveDateTime) -> LocalResult<DateTime<Tz>>,
{
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=DAY_START_SEARCH_STEPS)
        .map(|step| midnight + chrono::Duration::minutes(15 * step))
        .find_map(|t| resolve(t).earliest())
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::{FixedOffset, Timelike};
    use tempfile::TempDir;

    use super::testing::{FakeContributions, FakeWeather};
    use super::*;

    struct Fixture {
        _dir: TempDir,
        feeds: Feeds,
        contributions: Arc<FakeContributions>,
        weather: Arc<FakeWeather>,
    }

    fn fixture(fail: bool) -> Fixture {
        let dir = TempDir::new().unwrap();
        let contributions = Arc::new(FakeContributions {
            fail,
            ..Default::default()
        });
        let weather = Arc::new(FakeWeather::default());
        let feeds = Feeds::new(
            Arc::new(Gate::new()),
            DisplayStore::new(dir.path().join("display.json")),
            Some(contributions.clone() as Arc<dyn ContributionSource>),
            Some(weather.clone() as Arc<dyn WeatherSource>),
        );
        Fixture {
            _dir: dir,
            feeds,
            contributions,
            weather,
        }
    }

    #[tokio::test]
    async fn test_commits_summary() {
        let f = fixture(false);
        assert_eq!(
            f.feeds.commits_summary().await.unwrap(),
            "Today: 1 commit (demo: 3)"
        );
    }

    #[tokio::test]
    async fn test_weather_summary_is_cached() {
        let f = fixture(false);
        assert_eq!(f.feeds.weather_summary().await.unwrap(), "Berlin: 21C Clear");
        assert_eq!(f.feeds.weather_summary().await.unwrap(), "Berlin: 21C Clear");
        assert_eq!(f.weather.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_graph_modes_share_one_fetch() {
        let f = fixture(false);

        let bitmap = f.feeds.contribution_graph(GraphMode::Bitmap).await.unwrap();
        assert_eq!(bitmap.split(',').count(), 224);

        let levels = f.feeds.contribution_graph(GraphMode::Levels).await.unwrap();
        assert!(levels.starts_with("4,3,3,2,2,1,1,0"));
        assert_eq!(levels.split(',').count(), 32);

        assert_eq!(f.contributions.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_gate_skips_upstreams() {
        let f = fixture(false);
        f.feeds.set_display("hi");
        f.feeds.set_enabled(false);

        assert_eq!(f.feeds.get_display(), "");
        assert_eq!(f.feeds.commits_summary().await.unwrap(), "");
        assert_eq!(f.feeds.weather_summary().await.unwrap(), "");
        assert_eq!(f.feeds.contribution_graph(GraphMode::Bitmap).await.unwrap(), "");

        assert_eq!(f.contributions.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.weather.calls.load(Ordering::SeqCst), 0);

        f.feeds.set_auto_mode(false);
        assert_eq!(f.feeds.get_display(), "hi");
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let f = fixture(true);
        let err = f.feeds.commits_summary().await.unwrap_err();
        assert!(err.is_upstream());
        assert!(f.feeds.cache_ages().commits.is_none());
    }

    #[tokio::test]
    async fn test_missing_sources_report_configuration() {
        let dir = TempDir::new().unwrap();
        let feeds = Feeds::new(
            Arc::new(Gate::new()),
            DisplayStore::new(dir.path().join("display.json")),
            None,
            None,
        );

        assert!(matches!(
            feeds.commits_summary().await,
            Err(GlanceError::ConfigurationMissing(_))
        ));
        assert!(matches!(
            feeds.weather_summary().await,
            Err(GlanceError::ConfigurationMissing(_))
        ));
        assert!(matches!(
            feeds.contribution_graph(GraphMode::Levels).await,
            Err(GlanceError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_display_text_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("display.json");

        let feeds = Feeds::new(Arc::new(Gate::new()), DisplayStore::new(&path), None, None);
        feeds.set_display("hi");
        assert_eq!(feeds.get_display(), "hi");
        drop(feeds);

        let restarted = Feeds::new(Arc::new(Gate::new()), DisplayStore::new(&path), None, None);
        assert_eq!(restarted.get_display(), "hi");
    }

    #[test]
    fn test_display_text_recovers_from_poisoned_lock() {
        let dir = TempDir::new().unwrap();
        let feeds = Feeds::new(
            Arc::new(Gate::new()),
            DisplayStore::new(dir.path().join("display.json")),
            None,
            None,
        );
        feeds.set_display("before");

        let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = feeds.text();
            panic!("writer crashed while holding the display text");
        }));
        assert!(crashed.is_err());
        assert!(feeds.display_text.is_poisoned());

        assert_eq!(feeds.get_display(), "before");
        feeds.set_display("after");
        assert_eq!(feeds.get_display(), "after");
        assert_eq!(feeds.store.load(), "after");
    }

    #[test]
    fn test_first_instant_of_day_is_midnight() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

        let start = first_instant_of_day(date, |t| tz.from_local_datetime(&t)).unwrap();
        assert_eq!(start.naive_local(), date.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_first_instant_of_day_skips_dst_gap() {
        // Clocks jump from 00:00 to 01:00, so local midnight does not exist.
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 10, 20).unwrap();
        let resolve = |t: NaiveDateTime| {
            if t.hour() < 1 {
                LocalResult::None
            } else {
                tz.from_local_datetime(&t)
            }
        };

        let start = first_instant_of_day(date, resolve).unwrap();
        assert_eq!(start.naive_local(), date.and_hms_opt(1, 0, 0).unwrap());
        assert_eq!(start.date_naive(), date);
    }

    #[test]
    fn test_start_of_local_day() {
        let start = start_of_local_day().with_timezone(&Local);
        assert!(start <= Local::now());
        assert_eq!(start.date_naive(), Local::now().date_naive());
    }
}
