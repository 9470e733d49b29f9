//! # Settle API
//!
//! A small GitHub client speaking both REST and GraphQL.
//!
//! - [`GitHubApi`]: the object-safe capability (`rest`, `graphql`)
//! - [`GitHubApiExt`]: typed helpers (`fetch`, `send_json`, `remove`,
//!   `query`, `mutate`)
//! - [`Client`]: the real implementation over a decorated [`Transport`]
//! - [`options`]: decorators (headers, transport replacement, traffic logs)
//!
//! ## Example
//!
//! ```rust,ignore
//! use settle_api::{add_header, verbose_log, Client, GitHubApiExt, RateLimit};
//!
//! let client = Client::new(vec![
//!     verbose_log(false),
//!     add_header("Authorization", "token abc"),
//! ])?;
//! let limits: RateLimit = client.fetch("rate_limit").await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod options;
pub mod rate_limit;
pub mod transport;

pub use api::{GitHubApi, GitHubApiExt};
pub use client::{Client, Endpoints, GITHUB_API_URL, GITHUB_GRAPHQL_URL};
pub use error::{ApiError, ApiResult, GraphQlErrorEntry};
pub use options::{
    add_header, add_header_fn, inspectable_mime_type, replace_transport, verbose_log,
    verbose_log_from_env, ClientOption,
};
pub use rate_limit::{Quota, RateLimit, RateLimitResources, RateLimitUsage};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Re-exported so callers can name methods without depending on `reqwest`.
pub use reqwest::Method;
