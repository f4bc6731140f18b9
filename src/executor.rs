//! Carrying out an [ActionPlan] against the manifest and the repository.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{ActionPlan, Marker, Scenario};
use crate::error::{ReconcileError, Result};
use crate::git::{Identity, VersionControl};
use crate::manifest::ManifestStore;

/// Commit message used when none is configured
pub const DEFAULT_COMMIT_MESSAGE: &str =
    "chore(release): bump version {previous} -> {new} [skip ci]";

/// Where and how a plan gets published
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOptions {
    pub remote: String,
    pub branch: String,
    pub tag_prefix: String,
    /// Template with `{previous}` and `{new}` placeholders
    pub commit_message: String,
    pub identity: Identity,
}

/// What happened to one step of the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    ManifestWritten { version: String },
    ManifestAlreadyCurrent { version: String },
    Committed { branch: String },
    NothingToCommit,
    TagCreated { tag: String },
    TagAlreadyExists { tag: String },
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::ManifestWritten { version } => {
                write!(f, "Updated manifest version to {}", version)
            }
            StepOutcome::ManifestAlreadyCurrent { version } => {
                write!(f, "Manifest already declares {}", version)
            }
            StepOutcome::Committed { branch } => {
                write!(f, "Committed and pushed version bump to '{}'", branch)
            }
            StepOutcome::NothingToCommit => write!(f, "No manifest changes to commit"),
            StepOutcome::TagCreated { tag } => write!(f, "Created and pushed tag {}", tag),
            StepOutcome::TagAlreadyExists { tag } => {
                write!(f, "Tag {} already exists, pushed as-is", tag)
            }
        }
    }
}

/// Result of executing a plan
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationResult {
    pub scenario: Scenario,
    /// Latest published version before this run, `None` when bootstrapping
    pub previous_version: Option<String>,
    /// Version declared and tagged after this run
    pub current_version: String,
    /// Whether this run rewrote the manifest
    pub updated: bool,
    pub steps: Vec<StepOutcome>,
}

impl ReconciliationResult {
    /// The bumped version, empty when nothing was bumped
    pub fn new_version(&self) -> &str {
        if self.updated {
            &self.current_version
        } else {
            ""
        }
    }
}

/// Render a commit message template.
/// Example: "{previous} -> {new}" with 1.0.0+1 / 1.0.1+2 -> "1.0.0+1 -> 1.0.1+2"
pub fn render_commit_message(template: &str, previous: &str, new: &str) -> String {
    template.replace("{previous}", previous).replace("{new}", new)
}

/// Applies plans to a manifest and a repository.
///
/// Steps run in order (manifest, commit + push, tag) and the first failure
/// aborts the rest, so a tag never points at a commit that wasn't pushed.
/// Each step first checks whether an earlier run already did its work.
pub struct PublishExecutor<'a, R: VersionControl + ?Sized, M: ManifestStore + ?Sized> {
    repo: &'a R,
    manifest: &'a M,
    options: PublishOptions,
}

impl<'a, R: VersionControl + ?Sized, M: ManifestStore + ?Sized> PublishExecutor<'a, R, M> {
    pub fn new(repo: &'a R, manifest: &'a M, options: PublishOptions) -> Self {
        PublishExecutor {
            repo,
            manifest,
            options,
        }
    }

    pub fn execute(&self, plan: &ActionPlan) -> Result<ReconciliationResult> {
        let final_version = plan.final_identifier.raw();
        let mut steps = Vec::new();
        let mut updated = false;

        if plan.must_write_manifest {
            let step = self.write_manifest(final_version)?;
            updated = matches!(step, StepOutcome::ManifestWritten { .. });
            steps.push(step);
        }

        if plan.must_commit {
            steps.push(self.commit(plan)?);
        }

        if plan.must_create_marker {
            steps.push(self.publish_marker(plan)?);
        }

        Ok(ReconciliationResult {
            scenario: plan.scenario,
            previous_version: plan.previous.as_ref().map(|p| p.raw().to_string()),
            current_version: final_version.to_string(),
            updated,
            steps,
        })
    }

    fn write_manifest(&self, version: &str) -> Result<StepOutcome> {
        let current = self.manifest.read_version()?;
        if current.as_deref().map(str::trim) == Some(version) {
            debug!(version, "manifest already current");
            return Ok(StepOutcome::ManifestAlreadyCurrent {
                version: version.to_string(),
            });
        }

        self.manifest.write_version(version)?;
        Ok(StepOutcome::ManifestWritten {
            version: version.to_string(),
        })
    }

    fn commit(&self, plan: &ActionPlan) -> Result<StepOutcome> {
        let paths = [PathBuf::from(self.manifest.path())];

        if !self.repo.has_pending_changes(&paths)? {
            info!("no pending manifest changes, skipping commit");
            return Ok(StepOutcome::NothingToCommit);
        }

        let message = render_commit_message(
            &self.options.commit_message,
            plan.baseline_identifier.raw(),
            plan.final_identifier.raw(),
        );

        self.repo
            .commit_and_push(
                &paths,
                &message,
                &self.options.identity,
                &self.options.remote,
                &self.options.branch,
            )
            .map_err(|e| {
                ReconcileError::remote(format!(
                    "Failed to commit and push to '{}': {}",
                    self.options.branch, e
                ))
            })?;

        Ok(StepOutcome::Committed {
            branch: self.options.branch.clone(),
        })
    }

    fn publish_marker(&self, plan: &ActionPlan) -> Result<StepOutcome> {
        let tag = Marker::name_for(&self.options.tag_prefix, &plan.final_identifier);

        let outcome = if self.repo.tag_exists(&tag)? {
            info!(tag = %tag, "tag already exists, skipping creation");
            StepOutcome::TagAlreadyExists { tag: tag.clone() }
        } else {
            let message = format!("Release {}", plan.final_identifier.raw());
            self.repo
                .create_annotated_tag(&tag, &message, &self.options.identity)?;
            StepOutcome::TagCreated { tag: tag.clone() }
        };

        // Completes a previous run that created the tag but failed to push it;
        // pushing an up-to-date tag changes nothing
        self.repo
            .push_tag(&self.options.remote, &tag)
            .map_err(|e| ReconcileError::remote(format!("Failed to push tag '{}': {}", tag, e)))?;

        Ok(outcome)
    }
}
