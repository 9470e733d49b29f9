//! Auth token sources.

use crate::error::{ConfigError, Result};

/// Environment variable read by [`EnvTokenSource::default`].
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Something that can produce a GitHub token.
pub trait TokenSource: Send + Sync {
    /// Returns a non-empty token or [`ConfigError::MissingToken`].
    fn auth_token(&self) -> Result<String>;
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvTokenSource {
    var: String,
}

impl EnvTokenSource {
    /// Read from `var` instead of `GITHUB_TOKEN`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenSource {
    fn default() -> Self {
        Self::new(TOKEN_ENV)
    }
}

impl TokenSource for EnvTokenSource {
    fn auth_token(&self) -> Result<String> {
        non_empty(std::env::var(&self.var).ok())
    }
}

/// A token known up front (e.g. from a CLI flag).
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

impl TokenSource for StaticToken {
    fn auth_token(&self) -> Result<String> {
        non_empty(Some(self.0.clone()))
    }
}

fn non_empty(token: Option<String>) -> Result<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingToken)
}
