//! Rate-limit snapshots, used to report how many calls a run consumed.

use serde::Deserialize;

use crate::api::{GitHubApi, GitHubApiExt};
use crate::error::ApiResult;

/// One call budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Quota {
    /// Calls allowed per window.
    #[serde(default)]
    pub limit: u64,
    /// Calls made in the current window.
    #[serde(default)]
    pub used: u64,
    /// Calls left in the current window.
    #[serde(default)]
    pub remaining: u64,
    /// Window reset time (Unix timestamp).
    #[serde(default)]
    pub reset: u64,
}

/// Per-API budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RateLimitResources {
    /// REST budget.
    #[serde(default)]
    pub core: Quota,
    /// GraphQL budget.
    #[serde(default)]
    pub graphql: Quota,
}

/// Response of `GET rate_limit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RateLimit {
    /// Per-API budgets.
    #[serde(default)]
    pub resources: RateLimitResources,
    /// Combined budget.
    #[serde(default)]
    pub rate: Quota,
}

impl RateLimit {
    /// Takes a snapshot. Querying the rate limit does not count against it.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the call.
    pub async fn fetch<A: GitHubApi + ?Sized>(api: &A) -> ApiResult<Self> {
        api.fetch("rate_limit").await
    }
}

/// Calls consumed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitUsage {
    /// REST calls made.
    pub core_calls: u64,
    /// GraphQL points spent.
    pub graphql_calls: u64,
    /// REST calls left.
    pub core_remaining: u64,
    /// GraphQL points left.
    pub graphql_remaining: u64,
    /// Combined calls left.
    pub combined_remaining: u64,
}

impl RateLimitUsage {
    /// Compares two snapshots. A window reset in between yields zero rather
    /// than a negative count.
    pub fn between(start: &RateLimit, end: &RateLimit) -> Self {
        Self {
            core_calls: start
                .resources
                .core
                .remaining
                .saturating_sub(end.resources.core.remaining),
            graphql_calls: start
                .resources
                .graphql
                .remaining
                .saturating_sub(end.resources.graphql.remaining),
            core_remaining: end.resources.core.remaining,
            graphql_remaining: end.resources.graphql.remaining,
            combined_remaining: end.rate.remaining,
        }
    }
}
