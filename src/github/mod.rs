// GitHub API module.
// Provides the client and types for reading contribution data over GraphQL.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use types::*;
