// GitHub API endpoint functions.
// Provides typed queries for commit activity and the contribution calendar.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::{GlanceError, Result};
use crate::feeds::ContributionSource;

use super::client::GitHubClient;
use super::types::{CommitActivity, ContributionSeries, ContributionsCollection, UserData};

const COMMITS_QUERY: &str = r#"
query($login: String!, $from: DateTime!) {
    user(login: $login) {
        contributionsCollection(from: $from) {
            totalCommitContributions
            commitContributionsByRepository {
                repository { name }
                contributions { totalCount }
            }
        }
    }
}"#;

const CALENDAR_QUERY: &str = r#"
query($login: String!) {
    user(login: $login) {
        contributionsCollection {
            contributionCalendar {
                totalContributions
                weeks {
                    contributionDays {
                        contributionCount
                        date
                    }
                }
            }
        }
    }
}"#;

impl GitHubClient {
    /// Fetch the contributions collection for the configured user.
    async fn contributions(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<ContributionsCollection> {
        let data: UserData = self.graphql(query, variables).await?;
        data.user
            .map(|user| user.contributions_collection)
            .ok_or_else(|| GlanceError::UpstreamDataInvalid(format!("unknown user {}", self.username())))
    }

    /// Get commit totals since `from`.
    pub async fn get_commit_activity(&self, from: DateTime<Utc>) -> Result<CommitActivity> {
        let variables = json!({ "login": self.username(), "from": from.to_rfc3339() });
        self.contributions(COMMITS_QUERY, variables)
            .await?
            .commit_activity()
            .ok_or_else(|| GlanceError::UpstreamDataInvalid("missing totalCommitContributions".into()))
    }

    /// Get the last year of daily contribution counts.
    pub async fn get_contribution_calendar(&self) -> Result<ContributionSeries> {
        let variables = json!({ "login": self.username() });
        let calendar = self
            .contributions(CALENDAR_QUERY, variables)
            .await?
            .contribution_calendar
            .ok_or_else(|| GlanceError::UpstreamDataInvalid("missing contributionCalendar".into()))?;

        tracing::debug!(
            total = calendar.total_contributions,
            "fetched contribution calendar"
        );
        Ok(calendar.into_series())
    }
}

#[async_trait]
impl ContributionSource for GitHubClient {
    async fn commits_since(&self, from: DateTime<Utc>) -> Result<CommitActivity> {
        self.get_commit_activity(from).await
    }

    async fn contribution_calendar(&self) -> Result<ContributionSeries> {
        self.get_contribution_calendar().await
    }
}
