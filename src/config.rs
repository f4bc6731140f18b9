use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReconcileError, Result};
use crate::executor::DEFAULT_COMMIT_MESSAGE;
use crate::git::Identity;

/// Config file looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "version-reconcile.toml";

/// Represents the complete configuration for version-reconcile.
///
/// The access token is deliberately absent: it only ever comes from the
/// command line or the environment.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Location of the manifest declaring the project's version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManifestConfig {
    /// Path relative to the repository root
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("pubspec.yaml")
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            path: default_manifest_path(),
        }
    }
}

/// Remote, branch, tag naming and commit identity.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Prepended to the version to form the tag name (e.g., "v" -> "v1.2.3+4")
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Template with `{previous}` and `{new}` placeholders
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

fn default_author_name() -> String {
    "github-actions[bot]".to_string()
}

fn default_author_email() -> String {
    "41898282+github-actions[bot]@users.noreply.github.com".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            branch: default_branch(),
            tag_prefix: default_tag_prefix(),
            commit_message: default_commit_message(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

impl GitConfig {
    pub fn identity(&self) -> Identity {
        Identity::new(&self.author_name, &self.author_email)
    }
}

fn default_true() -> bool {
    true
}

/// Controls how tag resolution reacts to the remote.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Fetch tags from the remote before resolving the latest one
    #[serde(default = "default_true")]
    pub fetch_tags: bool,

    /// Abort when tags cannot be enumerated instead of bootstrapping
    #[serde(default)]
    pub strict_marker_resolution: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            fetch_tags: true,
            strict_marker_resolution: false,
        }
    }
}

impl Config {
    /// Check values that would produce unusable tags or commits.
    pub fn validate(&self) -> Result<()> {
        validate_tag_prefix(&self.git.tag_prefix)?;

        if self.git.branch.trim().is_empty() {
            return Err(ReconcileError::config("Branch must not be empty"));
        }
        if self.git.remote.trim().is_empty() {
            return Err(ReconcileError::config("Remote must not be empty"));
        }
        if self.manifest.path.is_absolute() {
            return Err(ReconcileError::config(format!(
                "Manifest path '{}' must be relative to the repository root",
                self.manifest.path.display()
            )));
        }
        Ok(())
    }
}

/// Validates a tag prefix.
///
/// The prefix is stripped back off by dropping every leading non-digit, so
/// it must not contain digits itself. Whitespace and characters git refuses
/// in ref names are rejected too.
///
/// # Examples
///
/// ```
/// # use version_reconcile::config::validate_tag_prefix;
/// assert!(validate_tag_prefix("v").is_ok());
/// assert!(validate_tag_prefix("").is_ok());
/// assert!(validate_tag_prefix("release-").is_ok());
/// assert!(validate_tag_prefix("v2-").is_err());
/// assert!(validate_tag_prefix("re lease").is_err());
/// ```
pub fn validate_tag_prefix(prefix: &str) -> Result<()> {
    if let Some(c) = prefix.chars().find(|c| c.is_ascii_digit()) {
        return Err(ReconcileError::config(format!(
            "Tag prefix '{}' must not contain digits (found '{}')",
            prefix, c
        )));
    }

    if let Some(c) = prefix
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(*c))
    {
        return Err(ReconcileError::config(format!(
            "Tag prefix '{}' contains invalid character {:?}",
            prefix, c
        )));
    }

    Ok(())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `version-reconcile.toml` in current directory
/// 3. `.version-reconcile.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => discover_config(),
    };

    let Some(path) = path else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReconcileError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    toml::from_str(&config_str)
        .map_err(|e| ReconcileError::config(format!("Invalid '{}': {}", path.display(), e)))
}

fn discover_config() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.manifest.path, PathBuf::from("pubspec.yaml"));
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.branch, "main");
        assert_eq!(config.git.tag_prefix, "v");
        assert!(config.behavior.fetch_tags);
        assert!(!config.behavior.strict_marker_resolution);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: Config = toml::from_str("[git]\nbranch = \"release\"\n").unwrap();
        assert_eq!(config.git.branch, "release");
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.commit_message, DEFAULT_COMMIT_MESSAGE);
        assert_eq!(config, Config {
            git: GitConfig {
                branch: "release".to_string(),
                ..GitConfig::default()
            },
            ..Config::default()
        });
    }

    #[test]
    fn test_identity() {
        let identity = GitConfig::default().identity();
        assert_eq!(identity.name, "github-actions[bot]");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.git.tag_prefix = "v1".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.git.branch = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.manifest.path = std::env::temp_dir().join("pubspec.yaml");
        assert!(config.validate().is_err());
    }
}
