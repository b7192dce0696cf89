//! The sorted site model: runtime → OS → version → release.
//!
//! Grouping uses a single composite key `(runtime, os, version)` mapped to the
//! set of contributing releases; a separate pass then lays the keys out in
//! display order:
//!
//! - runtimes ascending by name,
//! - OS columns `linux`, `mac`, `windows`, then any others ascending,
//! - versions newest first (major, then minor, then patch),
//! - releases of the same version newest first by creation time.
//!
//! Platform entries without a binary never contribute to a column.

use std::collections::{BTreeMap, BTreeSet};

use rtpub_schema::platform::order_os_columns;
use rtpub_schema::{CommonFile, PlatformEntry, Release, SemverParts, normalize_os};
use serde::Serialize;

use crate::loader::LoadedRelease;

/// Root of the site model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteModel {
    /// Runtimes in ascending name order. Empty, never absent, for no input.
    pub runtimes: Vec<RuntimeNode>,
}

/// One runtime and the OS columns it shipped for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeNode {
    /// Runtime name.
    pub name: String,
    /// OS columns in display order.
    pub platforms: Vec<OsNode>,
}

/// Versions of a runtime available for one OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsNode {
    /// Normalized OS name (`darwin` appears as `mac`).
    pub os: String,
    /// Versions, newest first.
    pub versions: Vec<VersionNode>,
}

/// One semantic version and every release that shipped it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionNode {
    /// Major version.
    pub major: u64,
    /// Minor version.
    pub minor: u64,
    /// Patch version.
    pub patch: u64,
    /// Canonical `major.minor.patch` string.
    pub version: String,
    /// Releases, newest first.
    pub releases: Vec<ReleaseView>,
}

/// A release as seen from one OS column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseView {
    /// The (possibly split) release row.
    pub release: Release,
    /// Platform entries for this OS column only.
    pub artifacts: Vec<PlatformEntry>,
    /// Release-wide files.
    pub common_files: Vec<CommonFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    runtime: String,
    os: String,
    version: SemverParts,
}

impl RuntimeNode {
    /// Distinct major versions across all OS columns, newest first.
    pub fn majors(&self) -> Vec<u64> {
        let majors: BTreeSet<u64> = self
            .platforms
            .iter()
            .flat_map(|p| p.versions.iter().map(|v| v.major))
            .collect();
        majors.into_iter().rev().collect()
    }
}

impl OsNode {
    /// Versions grouped by major, both levels newest first.
    pub fn by_major(&self) -> Vec<(u64, Vec<&VersionNode>)> {
        let mut groups: Vec<(u64, Vec<&VersionNode>)> = Vec::new();
        for version in &self.versions {
            match groups.last_mut() {
                Some((major, list)) if *major == version.major => list.push(version),
                _ => groups.push((version.major, vec![version])),
            }
        }
        groups
    }
}

/// Build the site model from loaded (and split) releases.
pub fn build_site_model(loaded: &[LoadedRelease]) -> SiteModel {
    let mut groups: BTreeMap<GroupKey, BTreeSet<usize>> = BTreeMap::new();

    for (idx, item) in loaded.iter().enumerate() {
        for platform in &item.artifacts.platforms {
            if platform.binary.is_none() {
                continue;
            }
            let key = GroupKey {
                runtime: item.release.runtime.clone(),
                os: normalize_os(&platform.platform_os).to_string(),
                version: item.release.semver(),
            };
            groups.entry(key).or_default().insert(idx);
        }
    }

    let runtime_names: BTreeSet<&str> = groups.keys().map(|k| k.runtime.as_str()).collect();

    let runtimes = runtime_names
        .into_iter()
        .map(|runtime| {
            let os_names = order_os_columns(
                groups
                    .keys()
                    .filter(|k| k.runtime == runtime)
                    .map(|k| k.os.as_str()),
            );

            let platforms = os_names
                .into_iter()
                .map(|os| OsNode {
                    os: os.to_string(),
                    versions: groups
                        .iter()
                        .filter(|(k, _)| k.runtime == runtime && k.os == os)
                        .rev()
                        .map(|(k, members)| version_node(k.version, os, members, loaded))
                        .collect(),
                })
                .collect();

            RuntimeNode {
                name: runtime.to_string(),
                platforms,
            }
        })
        .collect();

    SiteModel { runtimes }
}

fn version_node(
    version: SemverParts,
    os: &str,
    members: &BTreeSet<usize>,
    loaded: &[LoadedRelease],
) -> VersionNode {
    let mut releases: Vec<ReleaseView> = members
        .iter()
        .map(|&idx| project_for_os(&loaded[idx], os))
        .collect();
    releases.sort_by(|a, b| {
        b.release
            .created_at
            .cmp(&a.release.created_at)
            .then_with(|| a.release.tag.cmp(&b.release.tag))
            .then_with(|| a.release.version.cmp(&b.release.version))
    });

    VersionNode {
        major: version.major,
        minor: version.minor,
        patch: version.patch,
        version: version.to_string(),
        releases,
    }
}

/// The release with its platform entries narrowed to one OS column.
fn project_for_os(item: &LoadedRelease, os: &str) -> ReleaseView {
    ReleaseView {
        release: item.release.clone(),
        artifacts: item
            .artifacts
            .platforms
            .iter()
            .filter(|p| p.binary.is_some() && normalize_os(&p.platform_os) == os)
            .cloned()
            .collect(),
        common_files: item.artifacts.common_files.clone(),
    }
}
