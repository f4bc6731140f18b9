use std::cmp::Ordering;
use std::fmt;

/// A declared or published version: a semantic triple plus a build counter.
///
/// Values are immutable once parsed; `next()` and [`increment`] always
/// return a fresh identifier. `raw` keeps the exact (trimmed) source text so
/// it can be written back to the manifest or used as a tag name verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionIdentifier {
    major: u64,
    minor: u64,
    patch: u64,
    build: u64,
    raw: String,
}

impl VersionIdentifier {
    /// Create an identifier from its components; `raw` is the canonical
    /// `major.minor.patch+build` rendering.
    pub fn new(major: u64, minor: u64, patch: u64, build: u64) -> Self {
        VersionIdentifier {
            major,
            minor,
            patch,
            build,
            raw: format!("{}.{}.{}+{}", major, minor, patch, build),
        }
    }

    /// Parse a version string such as `"1.5.3+15"`.
    ///
    /// Returns `None` only for empty (or whitespace-only) input. Anything else
    /// yields a fully populated identifier: the build counter is whatever
    /// follows the first `+`, and each missing or non-numeric component
    /// falls back to 0.
    ///
    /// # Example
    /// ```
    /// # use version_reconcile::domain::VersionIdentifier;
    /// let v = VersionIdentifier::parse("1.5.3+15").unwrap();
    /// assert_eq!((v.major(), v.minor(), v.patch(), v.build()), (1, 5, 3, 15));
    ///
    /// let lenient = VersionIdentifier::parse("2.x").unwrap();
    /// assert_eq!((lenient.major(), lenient.minor(), lenient.patch()), (2, 0, 0));
    ///
    /// assert!(VersionIdentifier::parse("  ").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (base, build) = match raw.split_once('+') {
            Some((base, build)) => (base, number_or_zero(Some(build))),
            None => (raw, 0),
        };

        let mut parts = base.split('.');
        let major = number_or_zero(parts.next());
        let minor = number_or_zero(parts.next());
        let patch = number_or_zero(parts.next());

        Some(VersionIdentifier {
            major,
            minor,
            patch,
            build,
            raw: raw.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn build(&self) -> u64 {
        self.build
    }

    /// The exact string this identifier was parsed from (or rendered as).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The semantic `major.minor.patch` part.
    pub fn base(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Whether `raw` reads back exactly as the parsed components.
    ///
    /// `false` means at least one component was missing or malformed and
    /// defaulted to 0 during parsing.
    pub fn is_canonical(&self) -> bool {
        let base = self.base();
        self.raw == base || self.raw == format!("{}+{}", base, self.build)
    }

    /// Order two identifiers: semantic base first, build counter on ties.
    pub fn cmp_version(&self, other: &Self) -> Ordering {
        self.semver_base()
            .cmp(&other.semver_base())
            .then(self.build.cmp(&other.build))
    }

    /// Next identifier: patch and build both advance by one.
    ///
    /// A patch at `u64::MAX` carries into minor (and minor into major); a
    /// build counter at `u64::MAX` wraps to 0. The base always grows, so the
    /// result orders strictly after `self`. Returns `None` only when major
    /// would overflow too.
    pub fn checked_next(&self) -> Option<Self> {
        let build = self.build.checked_add(1).unwrap_or(0);
        let (major, minor, patch) = match self.patch.checked_add(1) {
            Some(patch) => (self.major, self.minor, patch),
            None => match self.minor.checked_add(1) {
                Some(minor) => (self.major, minor, 0),
                None => (self.major.checked_add(1)?, 0, 0),
            },
        };
        Some(VersionIdentifier::new(major, minor, patch, build))
    }

    /// Like [`VersionIdentifier::checked_next`], but returns an unchanged
    /// copy at `u64::MAX.u64::MAX.u64::MAX`; callers that publish the result
    /// must reject a non-increasing step.
    pub fn next(&self) -> Self {
        self.checked_next().unwrap_or_else(|| self.clone())
    }

    fn semver_base(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn number_or_zero(part: Option<&str>) -> u64 {
    part.and_then(|p| p.trim().parse::<u64>().ok()).unwrap_or(0)
}

/// Compare two possibly-absent identifiers.
///
/// Absent operands compare as `Equal` so callers never have to handle a
/// failure here; guard against `None` where the answer matters.
pub fn compare(a: Option<&VersionIdentifier>, b: Option<&VersionIdentifier>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp_version(b),
        _ => Ordering::Equal,
    }
}

/// Increment a possibly-absent identifier; `None` bootstraps to `1.0.0+1`.
pub fn increment(id: Option<&VersionIdentifier>) -> VersionIdentifier {
    match id {
        Some(id) => id.next(),
        None => VersionIdentifier::new(1, 0, 0, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionIdentifier {
        VersionIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full() {
        let id = v("1.5.3+15");
        assert_eq!(id.major(), 1);
        assert_eq!(id.minor(), 5);
        assert_eq!(id.patch(), 3);
        assert_eq!(id.build(), 15);
        assert_eq!(id.base(), "1.5.3");
        assert_eq!(id.raw(), "1.5.3+15");
        assert!(id.is_canonical());
    }

    #[test]
    fn test_parse_without_build() {
        let id = v("2.0.1");
        assert_eq!(id.build(), 0);
        assert_eq!(id.raw(), "2.0.1");
        assert!(id.is_canonical());
    }

    #[test]
    fn test_parse_empty_is_none() {
        assert!(VersionIdentifier::parse("").is_none());
        assert!(VersionIdentifier::parse("   \n").is_none());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = v("  1.2.3+4\n");
        assert_eq!(id.raw(), "1.2.3+4");
    }

    #[test]
    fn test_parse_malformed_components_default_to_zero() {
        let id = v("1.x.3+abc");
        assert_eq!((id.major(), id.minor(), id.patch(), id.build()), (1, 0, 3, 0));
        assert!(!id.is_canonical());

        let short = v("7");
        assert_eq!((short.major(), short.minor(), short.patch()), (7, 0, 0));
        assert!(!short.is_canonical());

        let garbage = v("not-a-version");
        assert_eq!(garbage.base(), "0.0.0");
        assert_eq!(garbage.raw(), "not-a-version");
    }

    #[test]
    fn test_parse_splits_on_first_plus_only() {
        let id = v("1.2.3+4+5");
        assert_eq!(id.base(), "1.2.3");
        assert_eq!(id.build(), 0);
    }

    #[test]
    fn test_compare_base_dominates_build() {
        assert_eq!(v("1.5.3+15").cmp_version(&v("1.0.0+99")), Ordering::Greater);
        assert_eq!(v("1.0.0+99").cmp_version(&v("1.5.3+15")), Ordering::Less);
        assert_eq!(v("1.10.0").cmp_version(&v("1.9.9")), Ordering::Greater);
    }

    #[test]
    fn test_compare_build_breaks_ties() {
        assert_eq!(v("1.0.0+2").cmp_version(&v("1.0.0+1")), Ordering::Greater);
        assert_eq!(v("1.0.0+1").cmp_version(&v("1.0.0+1")), Ordering::Equal);
        assert_eq!(v("1.0.0").cmp_version(&v("1.0.0+0")), Ordering::Equal);
    }

    #[test]
    fn test_compare_absent_is_equal() {
        let a = v("3.0.0");
        assert_eq!(compare(Some(&a), None), Ordering::Equal);
        assert_eq!(compare(None, Some(&a)), Ordering::Equal);
        assert_eq!(compare(None, None), Ordering::Equal);
    }

    #[test]
    fn test_compare_is_antisymmetric_and_transitive() {
        let ids: Vec<_> = ["0.0.0", "1.0.0+1", "1.0.0+2", "1.0.1", "1.5.3+15", "2.0.0+0"]
            .iter()
            .map(|s| v(s))
            .collect();

        for a in &ids {
            assert_eq!(a.cmp_version(a), Ordering::Equal);
            for b in &ids {
                assert_eq!(a.cmp_version(b), b.cmp_version(a).reverse());
                for c in &ids {
                    if a.cmp_version(b) == Ordering::Less && b.cmp_version(c) == Ordering::Less {
                        assert_eq!(a.cmp_version(c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn test_increment() {
        assert_eq!(v("1.0.0+1").next().raw(), "1.0.1+2");
        assert_eq!(v("1.5.3+15").next().raw(), "1.5.4+16");
        assert_eq!(v("2.3.4").next().raw(), "2.3.5+1");
    }

    #[test]
    fn test_increment_none_bootstraps() {
        assert_eq!(increment(None).raw(), "1.0.0+1");
    }

    #[test]
    fn test_increment_carries_at_component_limits() {
        let x = v("1.0.18446744073709551615+18446744073709551615");
        let next = increment(Some(&x));
        assert_eq!(next.raw(), "1.1.0+0");
        assert_eq!(compare(Some(&next), Some(&x)), Ordering::Greater);

        let y = v("2.18446744073709551615.18446744073709551615+7");
        assert_eq!(y.next().raw(), "3.0.0+8");
    }

    #[test]
    fn test_increment_at_ceiling() {
        let top = v("18446744073709551615.18446744073709551615.18446744073709551615+1");
        assert!(top.checked_next().is_none());
        assert_eq!(top.next().cmp_version(&top), Ordering::Equal);
    }

    #[test]
    fn test_increment_is_monotonic() {
        for s in ["0", "0.0.0", "1.0.0+1", "1.5.3+15", "9.9.9+0", "bad", "4.2"] {
            let x = v(s);
            assert_eq!(
                compare(Some(&increment(Some(&x))), Some(&x)),
                Ordering::Greater,
                "increment({}) must be greater",
                s
            );
        }
    }

    #[test]
    fn test_raw_round_trip() {
        for s in ["1.0.0+1", "0.2.9+31", "10.20.30+40"] {
            assert_eq!(v(s).raw(), s);
            let next = v(s).next();
            assert_eq!(v(next.raw()).raw(), next.raw());
        }
    }

    #[test]
    fn test_display_uses_raw() {
        assert_eq!(v("1.2.3+4").to_string(), "1.2.3+4");
    }
}
