//! Schema versioning and compatibility rules.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A semantic schema version.
///
/// Total order is lexicographic on `(major, minor, patch)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SchemaVersion {
    /// Major version. `0` marks a pre-release schema with no minor-level
    /// stability guarantee.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the next major version (minor and patch reset).
    #[must_use]
    pub const fn bump_major(self) -> Self {
        Self::new(self.major + 1, 0, 0)
    }

    /// Returns the next minor version (patch resets).
    #[must_use]
    pub const fn bump_minor(self) -> Self {
        Self::new(self.major, self.minor + 1, 0)
    }

    /// Returns the next patch version.
    #[must_use]
    pub const fn bump_patch(self) -> Self {
        Self::new(self.major, self.minor, self.patch + 1)
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid schema version `{text}`: {message}")]
pub struct VersionParseError {
    /// The rejected input.
    pub text: String,
    /// Why it was rejected.
    pub message: String,
}

impl FromStr for SchemaVersion {
    type Err = VersionParseError;

    /// Parses `"1"`, `"1.2"`, or `"1.2.3"`, with an optional leading `v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().strip_prefix('v').unwrap_or_else(|| s.trim());
        let mut parts = trimmed.split('.');
        let mut component = |name: &str| -> Result<u32, VersionParseError> {
            match parts.next() {
                None => Ok(0),
                Some(text) => text.parse::<u32>().map_err(|_| VersionParseError {
                    text: s.to_string(),
                    message: format!("{name} component `{text}` is not a non-negative integer"),
                }),
            }
        };
        let major = component("major")?;
        let minor = component("minor")?;
        let patch = component("patch")?;
        if parts.next().is_some() {
            return Err(VersionParseError {
                text: s.to_string(),
                message: "more than three components".to_string(),
            });
        }
        Ok(Self::new(major, minor, patch))
    }
}

/// Compares two versions lexicographically on `(major, minor, patch)`.
#[must_use]
pub fn compare_versions(a: SchemaVersion, b: SchemaVersion) -> Ordering {
    a.cmp(&b)
}

/// Whether a reader of `older` can consume data written under `newer`.
///
/// - `newer < older` is never compatible.
/// - Equal versions are always compatible.
/// - Different majors are incompatible.
/// - For `major == 0` any minor difference is also incompatible:
///   pre-1.0 schemas carry no stability guarantee at the minor level.
/// - Otherwise minor/patch increases are compatible.
#[must_use]
pub fn is_compatible(older: SchemaVersion, newer: SchemaVersion) -> bool {
    match compare_versions(older, newer) {
        Ordering::Greater => false,
        Ordering::Equal => true,
        Ordering::Less => {
            if older.major != newer.major {
                return false;
            }
            if older.major == 0 && older.minor != newer.minor {
                return false;
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        let v100 = SchemaVersion::new(1, 0, 0);
        let v110 = SchemaVersion::new(1, 1, 0);
        let v111 = SchemaVersion::new(1, 1, 1);
        let v200 = SchemaVersion::new(2, 0, 0);
        assert_eq!(compare_versions(v100, v100), Ordering::Equal);
        assert_eq!(compare_versions(v100, v110), Ordering::Less);
        assert_eq!(compare_versions(v111, v110), Ordering::Greater);
        assert_eq!(compare_versions(v200, v111), Ordering::Greater);
    }

    #[test]
    fn test_compatible_with_self() {
        for v in [
            SchemaVersion::new(0, 1, 0),
            SchemaVersion::new(1, 0, 0),
            SchemaVersion::new(3, 2, 9),
        ] {
            assert!(is_compatible(v, v));
        }
    }

    #[test]
    fn test_downgrade_never_compatible() {
        let older = SchemaVersion::new(1, 2, 0);
        let newer = SchemaVersion::new(1, 1, 9);
        assert!(!is_compatible(older, newer));
    }

    #[test]
    fn test_major_bump_incompatible() {
        assert!(!is_compatible(
            SchemaVersion::new(1, 4, 2),
            SchemaVersion::new(2, 0, 0)
        ));
    }

    #[test]
    fn test_minor_patch_bumps_compatible_after_one() {
        assert!(is_compatible(
            SchemaVersion::new(1, 0, 0),
            SchemaVersion::new(1, 3, 0)
        ));
        assert!(is_compatible(
            SchemaVersion::new(1, 3, 0),
            SchemaVersion::new(1, 3, 7)
        ));
    }

    #[test]
    fn test_pre_release_minor_is_breaking() {
        assert!(!is_compatible(
            SchemaVersion::new(0, 1, 0),
            SchemaVersion::new(0, 2, 0)
        ));
        assert!(is_compatible(
            SchemaVersion::new(0, 1, 0),
            SchemaVersion::new(0, 1, 4)
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!("1".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(1, 0, 0));
        assert_eq!("1.2".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(1, 2, 0));
        assert_eq!(
            "v1.2.3".parse::<SchemaVersion>().unwrap(),
            SchemaVersion::new(1, 2, 3)
        );
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
        assert!("a.b".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_bumps() {
        let v = SchemaVersion::new(1, 2, 3);
        assert_eq!(v.bump_major(), SchemaVersion::new(2, 0, 0));
        assert_eq!(v.bump_minor(), SchemaVersion::new(1, 3, 0));
        assert_eq!(v.bump_patch(), SchemaVersion::new(1, 2, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(SchemaVersion::new(1, 2, 3).to_string(), "1.2.3");
    }
}
