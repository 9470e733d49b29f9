//! # Settle Config
//!
//! Desired repository state and where it comes from.
//!
//! - [`RepoConfig`]: one repository's metadata, collaborators, teams and
//!   branch-protection rules, parsed from YAML and validated
//! - [`ConfigSource`]: a config directory or an explicit file list
//! - [`TokenSource`]: the auth token
//! - [`Settings`]: the optional `~/.settle.yaml` layered under CLI flags

pub mod auth;
pub mod error;
pub mod loader;
pub mod permission;
pub mod repo;
pub mod settings;

pub use auth::{EnvTokenSource, StaticToken, TokenSource, TOKEN_ENV};
pub use error::{ConfigError, Result};
pub use loader::{discover_files, load_file, ConfigSource, DEFAULT_CONFIG_DIR};
pub use permission::Permission;
pub use repo::{BranchConfig, CollaboratorConfig, RepoConfig, RepositorySettings, TeamConfig};
pub use settings::{Settings, SETTINGS_FILE_NAME};
