use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;

/// Major/minor/patch triple of a semantic version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct SemverParts {
    /// Major version.
    pub major: u64,
    /// Minor version.
    pub minor: u64,
    /// Patch version.
    pub patch: u64,
}

impl SemverParts {
    /// Parse a version string, tolerating a leading `v`.
    ///
    /// Never fails: unparsable input yields zeroed parts marked as degraded.
    ///
    /// ```
    /// use rtpub_schema::SemverParts;
    ///
    /// let v = SemverParts::parse("v22.15.0");
    /// assert!(!v.is_degraded());
    /// assert_eq!(v.value().major, 22);
    /// assert!(SemverParts::parse("latest").is_degraded());
    /// ```
    pub fn parse(version: &str) -> Outcome<Self> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        match semver::Version::parse(trimmed) {
            Ok(v) => Outcome::Resolved(Self {
                major: v.major,
                minor: v.minor,
                patch: v.patch,
            }),
            Err(_) => Outcome::Degraded(Self::default()),
        }
    }
}

impl std::fmt::Display for SemverParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One persisted publish event.
///
/// `version` is either a single version or, for an aggregated publish, a
/// comma-joined list such as `"22.15.0, 22.14.0"`. In the latter case the
/// parsed parts describe the first listed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Runtime name (e.g. `nodejs`).
    pub runtime: String,
    /// Version string, possibly comma-joined.
    pub version: String,
    /// Parsed major version.
    pub major: u64,
    /// Parsed minor version.
    pub minor: u64,
    /// Parsed patch version.
    pub patch: u64,
    /// Unique release tag.
    pub tag: String,
    /// Public release page URL.
    pub url: String,
    /// When the release was published.
    pub created_at: DateTime<Utc>,
    /// Serialized [`crate::ArtifactsDocument`].
    pub artifacts: String,
}

impl Release {
    /// Whether this row carries several versions.
    pub fn is_aggregated(&self) -> bool {
        self.version.contains(',')
    }

    /// Trimmed, non-empty entries of a comma-joined version string.
    pub fn sub_versions(&self) -> Vec<&str> {
        self.version
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Parsed version parts.
    pub fn semver(&self) -> SemverParts {
        SemverParts {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
        }
    }
}
