// Text formatters for the commit and weather feeds.
// Turn upstream data into the one-line strings sent to the display.

use crate::github::CommitActivity;
use crate::weather::CurrentWeather;

/// `"Today: 2 commits (glance: 1, dotfiles: 1)"`.
///
/// Repositories without commits are left out; the rest keep upstream order.
pub fn commit_summary(activity: &CommitActivity) -> String {
    let noun = if activity.total == 1 { "commit" } else { "commits" };
    let mut summary = format!("Today: {} {}", activity.total, noun);

    let repos: Vec<String> = activity
        .repositories
        .iter()
        .filter(|repo| repo.count > 0)
        .map(|repo| format!("{}: {}", repo.name, repo.count))
        .collect();

    if !repos.is_empty() {
        summary.push_str(&format!(" ({})", repos.join(", ")));
    }
    summary
}

/// Condition label for an OpenWeatherMap condition id.
pub fn condition_label(code: u16) -> &'static str {
    match code {
        200..=299 => "Storm",
        300..=399 => "Drizzle",
        500..=599 => "Rain",
        600..=699 => "Snow",
        700..=799 => "Fog",
        800 => "Clear",
        801.. => "Cloudy",
        _ => "N/A",
    }
}

/// `"Berlin: 21C Clear"`.
pub fn weather_summary(weather: &CurrentWeather) -> String {
    // Cast first so -0.4 shows as 0, not -0.
    let temp = weather.temperature.round() as i64;
    format!(
        "{}: {}{} {}",
        weather.city,
        temp,
        weather.units.letter(),
        condition_label(weather.condition_code)
    )
}
