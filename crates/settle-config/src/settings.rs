//! Optional user settings file (`~/.settle.yaml`).
//!
//! Values here sit below CLI flags and environment variables and above the
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::loader::{ConfigSource, DEFAULT_CONFIG_DIR};

/// File name looked up in the home directory.
pub const SETTINGS_FILE_NAME: &str = ".settle.yaml";

/// Settings file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// GitHub organization.
    pub org: Option<String>,
    /// Directory holding repository files.
    pub config_dir: Option<PathBuf>,
    /// Explicit repository files; takes precedence over `config_dir`.
    pub files: Vec<PathBuf>,
}

impl Settings {
    /// `~/.settle.yaml`, when a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_FILE_NAME))
    }

    /// Load the settings file.
    ///
    /// With an explicit `path` the file must exist. Otherwise the default
    /// location is tried and a missing file yields empty settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => {
                    tracing::debug!("no home directory, skipping settings file");
                    return Ok(Self::default());
                }
            },
        };

        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Settings {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let settings = Self::parse(&contents, &path)?;
        tracing::info!(path = %path.display(), "using settings file");
        Ok(settings)
    }

    /// Parse settings YAML. An empty document is empty settings.
    pub fn parse(yaml: &str, origin: &Path) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Settings {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Organization from the flag, falling back to the settings file.
    pub fn resolve_org(&self, flag: Option<String>) -> Result<String> {
        flag.or_else(|| self.org.clone())
            .map(|org| org.trim().to_string())
            .filter(|org| !org.is_empty())
            .ok_or(ConfigError::MissingOrg)
    }

    /// Where to read repository files from.
    ///
    /// Explicit files beat directories, and flags beat the settings file.
    pub fn resolve_source(&self, files: Vec<PathBuf>, config_dir: Option<PathBuf>) -> ConfigSource {
        if !files.is_empty() {
            return ConfigSource::Files(files);
        }
        if let Some(dir) = config_dir {
            return ConfigSource::Directory(dir);
        }
        if !self.files.is_empty() {
            return ConfigSource::Files(self.files.clone());
        }
        ConfigSource::Directory(
            self.config_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
        )
    }
}
