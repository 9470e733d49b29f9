//! Locating and reading repository files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::repo::RepoConfig;

/// Directory searched when nothing else is configured.
pub const DEFAULT_CONFIG_DIR: &str = "repo_config";

/// Where repository files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Every `.yml`/`.yaml` file directly inside a directory.
    Directory(PathBuf),
    /// An explicit list, used as given.
    Files(Vec<PathBuf>),
}

impl ConfigSource {
    /// Resolve the list of files to process, in processing order.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        match self {
            ConfigSource::Directory(dir) => discover_files(dir),
            ConfigSource::Files(files) => Ok(files.clone()),
        }
    }
}

/// List the YAML files directly inside `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are skipped.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if is_yaml {
            files.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping non-YAML file");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read, parse and validate one repository file.
pub fn load_file(path: &Path) -> Result<RepoConfig> {
    let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    RepoConfig::parse(&yaml, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_discover_sorted_yaml_only() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "web.yaml", "repository:\n  name: web\n");
        write(tmp.path(), "api.yml", "repository:\n  name: api\n");
        write(tmp.path(), "README.md", "# notes");
        fs::create_dir(tmp.path().join("nested.yml")).unwrap();

        let files = discover_files(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["api.yml", "web.yaml"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let err = discover_files(&tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_explicit_files_keep_order() {
        let source = ConfigSource::Files(vec![PathBuf::from("b.yml"), PathBuf::from("a.yml")]);
        assert_eq!(
            source.paths().unwrap(),
            vec![PathBuf::from("b.yml"), PathBuf::from("a.yml")]
        );
    }

    #[test]
    fn test_load_file() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "api.yml",
            "repository:\n  name: api\ncollaborators:\n  - username: alice\n    permission: push\n",
        );

        let config = load_file(&path).unwrap();
        assert_eq!(config.name(), "api");
        assert_eq!(config.collaborators[0].username, "alice");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file(Path::new("/nonexistent/settle/api.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
