//! Main workflow orchestration logic
//!
//! Wires the pieces together for one run: read the declared version, resolve
//! the latest tag, decide, then execute. Kept apart from `main.rs` so the
//! whole flow can run against mock collaborators.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::boundary::ReconcileWarning;
use crate::config::Config;
use crate::domain::{decide, ActionPlan, VersionIdentifier};
use crate::error::{ReconcileError, Result};
use crate::executor::{PublishExecutor, PublishOptions, ReconciliationResult};
use crate::git::VersionControl;
use crate::manifest::ManifestStore;
use crate::resolver::MarkerResolver;

/// Arguments for the reconciliation workflow
///
/// Settings already merged from the config file and the command line, so the
/// workflow can be called programmatically without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileArgs {
    pub config: Config,

    /// Access token for the remote; required unless `dry_run`
    pub token: Option<String>,

    /// Decide but don't write, commit, tag or push
    pub dry_run: bool,
}

impl ReconcileArgs {
    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            remote: self.config.git.remote.clone(),
            branch: self.config.git.branch.clone(),
            tag_prefix: self.config.git.tag_prefix.clone(),
            commit_message: self.config.git.commit_message.clone(),
            identity: self.config.git.identity(),
        }
    }
}

/// Everything a run decided and did
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub declared: VersionIdentifier,
    /// Name of the latest published tag, if any
    pub latest_tag: Option<String>,
    pub plan: ActionPlan,
    pub warnings: Vec<ReconcileWarning>,
    /// `None` for a dry run
    pub result: Option<ReconciliationResult>,
}

/// Run one reconciliation.
///
/// 1. Read and parse the declared version (fatal if absent)
/// 2. Resolve the latest published tag
/// 3. Decide the action plan
/// 4. Execute it, unless this is a dry run
pub fn run_reconciliation<R, M>(repo: &R, manifest: &M, args: &ReconcileArgs) -> Result<RunOutcome>
where
    R: VersionControl + ?Sized,
    M: ManifestStore + ?Sized,
{
    args.config.validate()?;

    if !args.dry_run && args.token.as_deref().map_or(true, str::is_empty) {
        return Err(ReconcileError::credential(
            "An access token is required to push (set INPUT_TOKEN or GITHUB_TOKEN)",
        ));
    }

    let mut warnings = Vec::new();

    let raw = manifest.read_version()?;
    let declared = raw
        .as_deref()
        .and_then(VersionIdentifier::parse)
        .ok_or_else(|| {
            ReconcileError::manifest(format!(
                "'{}' does not declare a version",
                manifest.path().display()
            ))
        })?;
    if !declared.is_canonical() {
        warn!(version = %declared, "declared version is malformed");
        warnings.push(ReconcileWarning::MalformedVersion {
            source: manifest.path().display().to_string(),
            raw: declared.raw().to_string(),
        });
    }

    let resolution = MarkerResolver::new(&args.config.git.remote)
        .with_fetch(args.config.behavior.fetch_tags)
        .strict(args.config.behavior.strict_marker_resolution)
        .resolve_latest(repo)?;
    warnings.extend(resolution.warnings);

    let latest = resolution.latest;
    if let Some(marker) = latest.as_ref().filter(|m| !m.identifier.is_canonical()) {
        warnings.push(ReconcileWarning::MalformedVersion {
            source: format!("tag {}", marker.name),
            raw: marker.identifier.raw().to_string(),
        });
    }

    let plan = decide(&declared, latest.as_ref().map(|m| &m.identifier));
    info!(
        scenario = %plan.scenario,
        declared = %declared,
        final_version = %plan.final_identifier,
        "reconciliation decided"
    );

    if plan.must_write_manifest
        && plan.final_identifier.cmp_version(&plan.baseline_identifier) != Ordering::Greater
    {
        return Err(ReconcileError::version(format!(
            "No version follows {}",
            plan.baseline_identifier
        )));
    }

    let result = if args.dry_run {
        debug!("dry run, skipping execution");
        None
    } else {
        Some(PublishExecutor::new(repo, manifest, args.publish_options()).execute(&plan)?)
    };

    Ok(RunOutcome {
        declared,
        latest_tag: latest.map(|m| m.name),
        plan,
        warnings,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scenario;
    use crate::git::MockRepository;
    use crate::manifest::InMemoryManifest;

    fn args() -> ReconcileArgs {
        ReconcileArgs {
            config: Config::default(),
            token: Some("token".to_string()),
            dry_run: false,
        }
    }

    #[test]
    fn test_missing_version_is_fatal() {
        let repo = MockRepository::new();
        let manifest = InMemoryManifest::new("pubspec.yaml", None);

        let err = run_reconciliation(&repo, &manifest, &args()).unwrap_err();
        assert!(err.to_string().contains("does not declare a version"));
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let repo = MockRepository::new();
        let manifest = InMemoryManifest::new("pubspec.yaml", Some("1.0.0+1"));
        let args = ReconcileArgs {
            token: None,
            ..args()
        };

        let err = run_reconciliation(&repo, &manifest, &args).unwrap_err();
        assert!(matches!(err, ReconcileError::Credential(_)));
        assert!(repo.tags().is_empty());
    }

    #[test]
    fn test_dry_run_has_no_side_effects() {
        let repo = MockRepository::new();
        repo.add_tag("v1.0.0+1");
        let manifest = InMemoryManifest::new("pubspec.yaml", Some("1.0.0+1"));
        let args = ReconcileArgs {
            token: None,
            dry_run: true,
            ..args()
        };

        let outcome = run_reconciliation(&repo, &manifest, &args).unwrap();
        assert_eq!(outcome.plan.scenario, Scenario::Same);
        assert!(outcome.result.is_none());
        assert_eq!(manifest.current().as_deref(), Some("1.0.0+1"));
        assert_eq!(repo.tags(), vec!["v1.0.0+1".to_string()]);
    }

    #[test]
    fn test_malformed_declared_version_warns() {
        let repo = MockRepository::new();
        let manifest = InMemoryManifest::new("pubspec.yaml", Some("1.x"));

        let outcome = run_reconciliation(&repo, &manifest, &args()).unwrap();
        assert_eq!(outcome.plan.scenario, Scenario::Bootstrap);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, ReconcileWarning::MalformedVersion { .. })));
    }

    #[test]
    fn test_no_version_after_ceiling_is_fatal() {
        let top = "18446744073709551615.18446744073709551615.18446744073709551615+3";
        let repo = MockRepository::new();
        repo.add_tag(format!("v{}", top));
        let manifest = InMemoryManifest::new("pubspec.yaml", Some(top));
        repo.track_manifest(&manifest);

        let err = run_reconciliation(&repo, &manifest, &args()).unwrap_err();
        assert!(matches!(err, ReconcileError::Version(_)));
        assert_eq!(manifest.current().as_deref(), Some(top));
        assert!(repo.commits().is_empty());
        assert!(repo.pushed_tags().is_empty());
    }
}
