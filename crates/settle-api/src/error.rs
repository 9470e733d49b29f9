//! Error types for GitHub API calls.

use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;

/// A single entry of the `errors` array in a GraphQL response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphQlErrorEntry {
    /// Error classification reported by GitHub (e.g. `NOT_FOUND`).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Path into the query that produced the error.
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("http error, '{method} {url}' failed ({status}): '{message}'")]
    Http {
        /// Request method.
        method: Method,
        /// Absolute request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// The `message` field of the response body, or the raw body text.
        message: String,
    },

    /// A 2xx GraphQL response carried application-level errors.
    #[error("graphql error: '{}'", join_messages(.errors))]
    GraphQl {
        /// Every error reported in the envelope, in response order.
        errors: Vec<GraphQlErrorEntry>,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A decorator produced a header that HTTP cannot carry.
    #[error("invalid value for header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: String,
    },
}

impl ApiError {
    /// HTTP status of an [`ApiError::Http`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn join_messages(errors: &[GraphQlErrorEntry]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
