//! Reading and rewriting the declared version in the project manifest.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::error::{ReconcileError, Result};

/// Access to the manifest that declares the project's version
pub trait ManifestStore: Send + Sync {
    /// Path of the manifest, relative to the working tree root when committed
    fn path(&self) -> &Path;

    /// The declared version string, `None` if the manifest declares none
    fn read_version(&self) -> Result<Option<String>>;

    /// Replace the declared version
    fn write_version(&self, version: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct PubspecVersion {
    version: Option<serde_yaml::Value>,
}

/// A YAML manifest with a top-level `version:` key (e.g. `pubspec.yaml`).
///
/// Writes only touch the `version:` line so comments and layout survive.
pub struct PubspecManifest {
    path: PathBuf,
    full_path: PathBuf,
}

impl PubspecManifest {
    /// # Arguments
    /// * `root` - Working tree root
    /// * `path` - Manifest path relative to `root`
    pub fn new(root: impl AsRef<Path>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let full_path = root.as_ref().join(&path);
        PubspecManifest { path, full_path }
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.full_path).map_err(|e| {
            ReconcileError::manifest(format!(
                "Cannot read manifest '{}': {}",
                self.full_path.display(),
                e
            ))
        })
    }
}

fn version_line() -> Result<Regex> {
    // Top-level key only: no indentation before `version:`
    Regex::new(
        r#"(?m)^version:[ \t]*(?P<value>"[^"\n]*"|'[^'\n]*'|[^#\r\n]*?)(?P<trailer>[ \t]*(?:#[^\r\n]*)?)\r?$"#,
    )
    .map_err(|e| ReconcileError::manifest(format!("Invalid version line pattern: {}", e)))
}

/// Text of the top-level `version:` value as written, quotes removed
fn scalar_text(content: &str) -> Result<Option<String>> {
    let re = version_line()?;
    Ok(re.captures(content).map(|caps| {
        caps["value"]
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'')
            .to_string()
    }))
}

impl ManifestStore for PubspecManifest {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_version(&self) -> Result<Option<String>> {
        let content = self.read()?;
        let manifest: PubspecVersion = serde_yaml::from_str(&content)?;

        // Unquoted `1.10` or `2` deserialize as numbers, which would lose
        // trailing zeros; take the scalar text from the line instead
        let version = match manifest.version {
            None | Some(serde_yaml::Value::Null) => None,
            Some(serde_yaml::Value::String(s)) => Some(s),
            Some(serde_yaml::Value::Number(n)) => {
                Some(scalar_text(&content)?.unwrap_or_else(|| n.to_string()))
            }
            Some(other) => {
                return Err(ReconcileError::manifest(format!(
                    "'version' in '{}' is not a scalar: {:?}",
                    self.full_path.display(),
                    other
                )))
            }
        };

        Ok(version.filter(|v| !v.trim().is_empty()))
    }

    fn write_version(&self, version: &str) -> Result<()> {
        let content = self.read()?;
        let re = version_line()?;

        if !re.is_match(&content) {
            return Err(ReconcileError::manifest(format!(
                "No top-level 'version:' line in '{}'",
                self.full_path.display()
            )));
        }

        let updated = re.replacen(&content, 1, |caps: &regex::Captures| {
            let line = &caps[0];
            let trailer = &caps["trailer"];
            let eol = if line.ends_with('\r') { "\r" } else { "" };
            format!("version: {}{}{}", version, trailer, eol)
        });

        fs::write(&self.full_path, updated.as_bytes()).map_err(|e| {
            ReconcileError::manifest(format!(
                "Cannot write manifest '{}': {}",
                self.full_path.display(),
                e
            ))
        })?;

        info!(path = %self.path.display(), version, "updated manifest version");
        Ok(())
    }
}

/// Manifest held in memory; clones share the same content.
#[derive(Debug, Clone)]
pub struct InMemoryManifest {
    path: PathBuf,
    version: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl InMemoryManifest {
    pub fn new(path: impl Into<PathBuf>, version: Option<&str>) -> Self {
        InMemoryManifest {
            path: path.into(),
            version: Arc::new(Mutex::new(version.map(str::to_string))),
            fail_writes: Arc::new(Mutex::new(false)),
        }
    }

    /// Current declared version
    pub fn current(&self) -> Option<String> {
        self.version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Make later writes fail, as a read-only file would
    pub fn fail_writes(&self, fail: bool) {
        *self
            .fail_writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = fail;
    }
}

impl ManifestStore for InMemoryManifest {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_version(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    fn write_version(&self, version: &str) -> Result<()> {
        if *self
            .fail_writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
        {
            return Err(ReconcileError::manifest(format!(
                "Cannot write manifest '{}': read-only",
                self.path.display()
            )));
        }

        *self
            .version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(version.to_string());
        Ok(())
    }
}
