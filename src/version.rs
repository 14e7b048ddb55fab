//! Semantic version utilities
//!
//! Versions seen by the regenerator come from several places (the generator's
//! `--version` output, `info.version` of the OpenAPI document, `gen.yaml`) and
//! are not always strict semver. [`parse_version`] accepts the loose forms those
//! sources produce, and [`Bump`] encodes the segment precedence used when
//! comparing two versions.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RegenError, Result};

/// Parse a version string, tolerating a leading `v` and missing minor/patch segments.
///
/// `"v1.2"` parses as `1.2.0`. Pre-release and build suffixes are kept.
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);

    let mut padded = core.to_string();
    for _ in core.matches('.').count()..2 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);

    Version::parse(&padded)
}

/// Parse a version that must be valid, naming `field` in the error
pub fn parse_required(field: &'static str, value: &str) -> Result<Version> {
    parse_version(value).map_err(|source| RegenError::InvalidVersion {
        field,
        value: value.to_string(),
        source,
    })
}

/// A version bump level, ordered by precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bump {
    None,
    Patch,
    Minor,
    Major,
}

impl Bump {
    /// Rank the change from `previous` to `current`.
    ///
    /// Segments are compared most-significant first and the first segment that
    /// increased decides the level. Segments that decreased are skipped over, so
    /// `2.0.0 -> 1.5.0` ranks as [`Bump::Minor`].
    pub fn rank(current: &Version, previous: &Version) -> Bump {
        let segments = [
            (current.major, previous.major, Bump::Major),
            (current.minor, previous.minor, Bump::Minor),
            (current.patch, previous.patch, Bump::Patch),
        ];

        segments
            .into_iter()
            .find(|(cur, prev, _)| cur > prev)
            .map(|(_, _, bump)| bump)
            .unwrap_or(Bump::None)
    }

    /// Apply this bump to a version, zeroing every less-significant segment.
    ///
    /// The result never carries pre-release or build metadata.
    pub fn apply(&self, version: &Version) -> Version {
        match self {
            Bump::Major => Version::new(version.major + 1, 0, 0),
            Bump::Minor => Version::new(version.major, version.minor + 1, 0),
            Bump::Patch => Version::new(version.major, version.minor, version.patch + 1),
            Bump::None => Version::new(version.major, version.minor, version.patch),
        }
    }
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bump::None => "none",
            Bump::Patch => "patch",
            Bump::Minor => "minor",
            Bump::Major => "major",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!(v("1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v("v1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v("1.2"), Version::new(1, 2, 0));
        assert_eq!(v("3"), Version::new(3, 0, 0));
        assert_eq!(v("1.0.0-beta.1").pre.as_str(), "beta.1");
        assert_eq!(v("2.1-rc1").to_string(), "2.1.0-rc1");
    }

    #[test]
    fn test_invalid_versions() {
        assert!(parse_version("").is_err());
        assert!(parse_version("latest").is_err());
        assert!(parse_version("1.x").is_err());
    }

    #[test]
    fn test_rank_most_significant_wins() {
        assert_eq!(Bump::rank(&v("2.0.0"), &v("1.2.3")), Bump::Major);
        assert_eq!(Bump::rank(&v("1.3.0"), &v("1.2.3")), Bump::Minor);
        assert_eq!(Bump::rank(&v("1.2.4"), &v("1.2.3")), Bump::Patch);
        assert_eq!(Bump::rank(&v("1.2.3"), &v("1.2.3")), Bump::None);
        assert_eq!(Bump::rank(&v("1.2.2"), &v("1.2.3")), Bump::None);
    }

    #[test]
    fn test_rank_skips_decreased_segments() {
        assert_eq!(Bump::rank(&v("1.5.0"), &v("2.0.0")), Bump::Minor);
        assert_eq!(Bump::rank(&v("1.1.9"), &v("1.2.3")), Bump::Patch);
    }

    #[test]
    fn test_bump_precedence_ordering() {
        assert!(Bump::Major > Bump::Minor);
        assert!(Bump::Minor > Bump::Patch);
        assert!(Bump::Patch > Bump::None);
    }

    #[test]
    fn test_apply() {
        let base = v("1.2.3");
        assert_eq!(Bump::Major.apply(&base).to_string(), "2.0.0");
        assert_eq!(Bump::Minor.apply(&base).to_string(), "1.3.0");
        assert_eq!(Bump::Patch.apply(&base).to_string(), "1.2.4");
        assert_eq!(Bump::None.apply(&base).to_string(), "1.2.3");
        assert_eq!(Bump::Patch.apply(&v("1.2.0-beta")).to_string(), "1.2.1");
    }
}
