use std::cmp::Ordering;

use super::version::VersionIdentifier;

/// A published release tag and the version it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub identifier: VersionIdentifier,
}

impl Marker {
    /// Interpret a tag name as a marker (e.g., "v1.5.3+15" -> 1.5.3+15).
    ///
    /// Every leading non-digit character is treated as prefix and dropped.
    /// Returns `None` when nothing numeric is left to parse.
    pub fn from_name(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let version_part = name.trim_start_matches(|c: char| !c.is_ascii_digit());
        let identifier = VersionIdentifier::parse(version_part)?;
        Some(Marker { name, identifier })
    }

    /// Tag name for an identifier: `<prefix><raw>`.
    /// Example: prefix="v", raw="1.5.4+16" -> "v1.5.4+16"
    pub fn name_for(prefix: &str, identifier: &VersionIdentifier) -> String {
        format!("{}{}", prefix, identifier.raw())
    }

    /// Pick the highest marker by version; equal versions fall back to the
    /// greatest name so the answer doesn't depend on listing order.
    pub fn latest<I>(markers: I) -> Option<Marker>
    where
        I: IntoIterator<Item = Marker>,
    {
        markers.into_iter().max_by(|a, b| {
            match a.identifier.cmp_version(&b.identifier) {
                Ordering::Equal => a.name.cmp(&b.name),
                other => other,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_strips_prefix() {
        let marker = Marker::from_name("v1.5.3+15").unwrap();
        assert_eq!(marker.name, "v1.5.3+15");
        assert_eq!(marker.identifier.raw(), "1.5.3+15");

        let release = Marker::from_name("release-2.0.0").unwrap();
        assert_eq!(release.identifier.base(), "2.0.0");
    }

    #[test]
    fn test_from_name_without_prefix() {
        let marker = Marker::from_name("1.0.0+1").unwrap();
        assert_eq!(marker.identifier.raw(), "1.0.0+1");
    }

    #[test]
    fn test_from_name_without_digits() {
        assert!(Marker::from_name("latest").is_none());
        assert!(Marker::from_name("").is_none());
    }

    #[test]
    fn test_name_for() {
        let id = VersionIdentifier::parse("1.5.4+16").unwrap();
        assert_eq!(Marker::name_for("v", &id), "v1.5.4+16");
        assert_eq!(Marker::name_for("", &id), "1.5.4+16");
    }

    #[test]
    fn test_latest_uses_version_order_not_lexical() {
        let markers = ["v1.9.0+9", "v1.10.0+10", "v1.2.0+2"]
            .iter()
            .filter_map(|n| Marker::from_name(*n));

        let latest = Marker::latest(markers).unwrap();
        assert_eq!(latest.name, "v1.10.0+10");
    }

    #[test]
    fn test_latest_build_tiebreak() {
        let markers = ["v1.0.0+3", "v1.0.0+12"]
            .iter()
            .filter_map(|n| Marker::from_name(*n));

        assert_eq!(Marker::latest(markers).unwrap().name, "v1.0.0+12");
    }

    #[test]
    fn test_latest_is_order_independent() {
        let forward = ["1.0.0", "v1.0.0"].iter().filter_map(|n| Marker::from_name(*n));
        let backward = ["v1.0.0", "1.0.0"].iter().filter_map(|n| Marker::from_name(*n));

        assert_eq!(
            Marker::latest(forward).unwrap().name,
            Marker::latest(backward).unwrap().name
        );
    }

    #[test]
    fn test_latest_empty() {
        assert!(Marker::latest(Vec::new()).is_none());
    }
}
