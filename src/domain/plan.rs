use std::cmp::Ordering;
use std::fmt;

use super::version::{compare, increment, VersionIdentifier};

/// Which of the four reconciliation cases applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// No marker has been published yet
    Bootstrap,
    /// Declared version equals the latest marker
    Same,
    /// Declared version is behind the latest marker
    Regressed,
    /// Declared version is ahead of the latest marker
    Ahead,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::Bootstrap => "bootstrap",
            Scenario::Same => "same",
            Scenario::Regressed => "regressed",
            Scenario::Ahead => "ahead",
        };
        f.write_str(name)
    }
}

/// Side effects to perform for one run, decided up front.
///
/// Nothing here touches the manifest or the repository; the plan is handed to
/// [`crate::executor::PublishExecutor`] afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub scenario: Scenario,
    /// Version that ends up in the manifest and in the published tag
    pub final_identifier: VersionIdentifier,
    /// Version cited as "previous" in the commit message
    pub baseline_identifier: VersionIdentifier,
    /// Latest published version, `None` when bootstrapping
    pub previous: Option<VersionIdentifier>,
    pub must_write_manifest: bool,
    pub must_commit: bool,
    pub must_create_marker: bool,
}

/// Decide what to publish given the declared version and the latest marker.
///
/// | scenario  | final              | manifest + commit |
/// |-----------|--------------------|-------------------|
/// | bootstrap | declared           | no                |
/// | same      | increment(declared)| yes               |
/// | regressed | increment(latest)  | yes               |
/// | ahead     | declared           | no                |
///
/// A tag is always planned; the executor skips it when it already exists.
pub fn decide(declared: &VersionIdentifier, latest: Option<&VersionIdentifier>) -> ActionPlan {
    let Some(latest) = latest else {
        return ActionPlan {
            scenario: Scenario::Bootstrap,
            final_identifier: declared.clone(),
            baseline_identifier: declared.clone(),
            previous: None,
            must_write_manifest: false,
            must_commit: false,
            must_create_marker: true,
        };
    };

    let (scenario, final_identifier) = match compare(Some(declared), Some(latest)) {
        Ordering::Equal => (Scenario::Same, increment(Some(declared))),
        Ordering::Less => (Scenario::Regressed, increment(Some(latest))),
        Ordering::Greater => (Scenario::Ahead, declared.clone()),
    };
    let bump = scenario != Scenario::Ahead;

    ActionPlan {
        scenario,
        final_identifier,
        baseline_identifier: latest.clone(),
        previous: Some(latest.clone()),
        must_write_manifest: bump,
        must_commit: bump,
        must_create_marker: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionIdentifier {
        VersionIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_bootstrap() {
        let plan = decide(&v("1.0.0+1"), None);
        assert_eq!(plan.scenario, Scenario::Bootstrap);
        assert_eq!(plan.final_identifier.raw(), "1.0.0+1");
        assert_eq!(plan.baseline_identifier.raw(), "1.0.0+1");
        assert!(plan.previous.is_none());
        assert!(plan.must_create_marker);
        assert!(!plan.must_write_manifest);
        assert!(!plan.must_commit);
    }

    #[test]
    fn test_same() {
        let plan = decide(&v("1.0.0+1"), Some(&v("1.0.0+1")));
        assert_eq!(plan.scenario, Scenario::Same);
        assert_eq!(plan.final_identifier.raw(), "1.0.1+2");
        assert_eq!(plan.baseline_identifier.raw(), "1.0.0+1");
        assert!(plan.must_write_manifest);
        assert!(plan.must_commit);
        assert!(plan.must_create_marker);
    }

    #[test]
    fn test_regressed_increments_from_latest() {
        let plan = decide(&v("1.0.0+1"), Some(&v("1.5.3+15")));
        assert_eq!(plan.scenario, Scenario::Regressed);
        assert_eq!(plan.final_identifier.raw(), "1.5.4+16");
        assert_eq!(plan.baseline_identifier.raw(), "1.5.3+15");
        assert!(plan.must_write_manifest);
        assert!(plan.must_commit);
    }

    #[test]
    fn test_ahead() {
        let plan = decide(&v("1.5.4+16"), Some(&v("1.5.3+15")));
        assert_eq!(plan.scenario, Scenario::Ahead);
        assert_eq!(plan.final_identifier.raw(), "1.5.4+16");
        assert_eq!(plan.baseline_identifier.raw(), "1.5.3+15");
        assert_eq!(plan.previous.as_ref().map(|p| p.raw()), Some("1.5.3+15"));
        assert!(!plan.must_write_manifest);
        assert!(!plan.must_commit);
        assert!(plan.must_create_marker);
    }

    #[test]
    fn test_same_base_lower_build_is_regressed() {
        let plan = decide(&v("1.5.3+14"), Some(&v("1.5.3+15")));
        assert_eq!(plan.scenario, Scenario::Regressed);
        assert_eq!(plan.final_identifier.raw(), "1.5.4+16");
    }

    #[test]
    fn test_same_at_patch_limit_moves_forward() {
        let x = v("1.0.18446744073709551615+18446744073709551615");
        let plan = decide(&x, Some(&x));
        assert_eq!(plan.scenario, Scenario::Same);
        assert_eq!(plan.final_identifier.raw(), "1.1.0+0");
        assert_eq!(plan.final_identifier.cmp_version(&x), Ordering::Greater);
    }

    #[test]
    fn test_decide_is_deterministic() {
        let declared = v("2.1.0+7");
        let latest = v("2.1.0+7");
        assert_eq!(decide(&declared, Some(&latest)), decide(&declared, Some(&latest)));
    }

    #[test]
    fn test_bumped_final_is_always_ahead_of_latest() {
        for (declared, latest) in [("1.0.0", "1.0.0"), ("0.1.0+3", "4.0.0+1"), ("1.0.0+9", "1.0.0+10")] {
            let latest = v(latest);
            let plan = decide(&v(declared), Some(&latest));
            assert_eq!(
                plan.final_identifier.cmp_version(&latest),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn test_scenario_display() {
        assert_eq!(Scenario::Bootstrap.to_string(), "bootstrap");
        assert_eq!(Scenario::Regressed.to_string(), "regressed");
    }
}
