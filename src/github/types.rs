// GitHub API response types.
// Defines the GraphQL payload shapes and the contribution data derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Commits made today, in total and per repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitActivity {
    pub total: u64,
    /// Repositories in the order GitHub returned them.
    pub repositories: Vec<RepositoryCommits>,
}

/// Commit count for a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCommits {
    pub name: String,
    pub count: u64,
}

/// One day of the contribution calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
}

/// Chronological daily contribution counts.
pub type ContributionSeries = Vec<ContributionDay>;

/// Plain counts of a series, oldest first.
pub fn counts(series: &[ContributionDay]) -> Vec<u32> {
    series.iter().map(|day| day.count).collect()
}

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// Error entry in a GraphQL response.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `data` payload of both contribution queries.
#[derive(Debug, Deserialize)]
pub struct UserData {
    pub user: Option<UserContributions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContributions {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub total_commit_contributions: Option<u64>,
    #[serde(default)]
    pub commit_contributions_by_repository: Vec<RepositoryContributions>,
    pub contribution_calendar: Option<ContributionCalendar>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryContributions {
    pub repository: RepositoryRef,
    pub contributions: TotalCount,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u64,
    pub weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek {
    pub contribution_days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub contribution_count: u32,
    pub date: NaiveDate,
}

impl ContributionCalendar {
    /// Flatten weeks into a chronological series.
    pub fn into_series(self) -> ContributionSeries {
        let mut series: ContributionSeries = self
            .weeks
            .into_iter()
            .flat_map(|week| week.contribution_days)
            .map(|day| ContributionDay {
                date: day.date,
                count: day.contribution_count,
            })
            .collect();
        series.sort_by_key(|day| day.date);
        series
    }
}

impl ContributionsCollection {
    /// Today's commit totals. `None` if GitHub left out the total.
    pub fn commit_activity(self) -> Option<CommitActivity> {
        let total = self.total_commit_contributions?;
        let repositories = self
            .commit_contributions_by_repository
            .into_iter()
            .map(|repo| RepositoryCommits {
                name: repo.repository.name,
                count: repo.contributions.total_count,
            })
            .collect();
        Some(CommitActivity {
            total,
            repositories,
        })
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
