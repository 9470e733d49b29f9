//! Error types for the config crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading desired state or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file or directory could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A repository file is not valid YAML for the expected shape.
    #[error("failed to parse '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A repository file parsed but describes an impossible state.
    #[error("invalid config '{}': {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    /// No usable auth token.
    #[error("no GitHub token: set GITHUB_TOKEN or pass --token")]
    MissingToken,

    /// No organization name.
    #[error("no GitHub organization: set GITHUB_ORG, pass --org or add `org` to the settings file")]
    MissingOrg,

    /// The settings file exists but could not be used.
    #[error("settings file '{}': {reason}", path.display())]
    Settings { path: PathBuf, reason: String },
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
