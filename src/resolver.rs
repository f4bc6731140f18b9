//! Finding the most recently published release tag.

use tracing::{debug, warn};

use crate::boundary::ReconcileWarning;
use crate::domain::Marker;
use crate::error::{ReconcileError, Result};
use crate::git::VersionControl;

/// Outcome of resolving the latest marker
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Highest published marker, `None` when there is none yet
    pub latest: Option<Marker>,
    pub warnings: Vec<ReconcileWarning>,
}

/// Resolves the latest published marker through a [VersionControl]
#[derive(Debug, Clone)]
pub struct MarkerResolver {
    remote: String,
    fetch: bool,
    strict: bool,
}

impl MarkerResolver {
    /// # Arguments
    /// * `remote` - Remote to fetch tags from
    pub fn new(remote: impl Into<String>) -> Self {
        MarkerResolver {
            remote: remote.into(),
            fetch: true,
            strict: false,
        }
    }

    /// Whether to fetch tags from the remote before listing them
    pub fn with_fetch(mut self, fetch: bool) -> Self {
        self.fetch = fetch;
        self
    }

    /// Fail the run when tags cannot be enumerated instead of treating the
    /// repository as having no tags
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Find the highest-versioned tag.
    ///
    /// Tags without any digits are skipped with a warning. A failed fetch or
    /// listing yields `latest = None` plus a warning, which sends the run down
    /// the bootstrap path; in strict mode it is an error instead.
    pub fn resolve_latest<R: VersionControl + ?Sized>(&self, repo: &R) -> Result<Resolution> {
        let names = match self.enumerate(repo) {
            Ok(names) => names,
            Err(e) if self.strict => {
                return Err(ReconcileError::remote(format!(
                    "Cannot enumerate release tags: {}",
                    e
                )))
            }
            Err(e) => {
                warn!(error = %e, "tag enumeration failed, assuming no tags");
                return Ok(Resolution {
                    latest: None,
                    warnings: vec![ReconcileWarning::MarkerEnumerationFailed {
                        reason: e.to_string(),
                    }],
                });
            }
        };

        let mut warnings = Vec::new();
        let mut markers = Vec::with_capacity(names.len());
        for name in names {
            match Marker::from_name(name.as_str()) {
                Some(marker) => markers.push(marker),
                None => {
                    warn!(tag = %name, "ignoring tag without a version");
                    warnings.push(ReconcileWarning::UnparsableTag { tag: name });
                }
            }
        }

        let latest = Marker::latest(markers);
        debug!(
            latest = latest.as_ref().map(|m| m.name.as_str()).unwrap_or("none"),
            "resolved latest tag"
        );

        Ok(Resolution { latest, warnings })
    }

    fn enumerate<R: VersionControl + ?Sized>(&self, repo: &R) -> Result<Vec<String>> {
        if self.fetch {
            repo.fetch_tags(&self.remote)?;
        }
        repo.list_tags()
    }
}
