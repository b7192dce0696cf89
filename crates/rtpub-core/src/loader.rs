//! Release loading and aggregated-release splitting.
//!
//! A release row may carry several versions published together
//! (`"22.15.0, 22.14.0"`). Each listed version becomes its own view, holding
//! only the platform entries whose binary or audit file name mentions it.

use rtpub_schema::{ArtifactsDocument, DocumentError, Outcome, PlatformEntry, Release, SemverParts};
use thiserror::Error;

/// Errors loading the release snapshot. Any error aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A release row carries an unparsable artifacts document.
    #[error("release {tag}: {source}")]
    Document {
        /// Tag of the offending release.
        tag: String,
        /// Underlying parse failure.
        #[source]
        source: DocumentError,
    },
}

/// A release paired with its parsed artifacts, ready for the site model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRelease {
    /// The release row, or a per-version copy of an aggregated row.
    pub release: Release,
    /// Artifacts belonging to this view.
    pub artifacts: ArtifactsDocument,
    /// How the version parts on `release` were obtained.
    pub version: Outcome<SemverParts>,
}

/// Parse every release and expand aggregated rows into per-version views.
///
/// # Errors
///
/// Returns [`LoadError::Document`] for the first row whose artifacts document
/// fails to parse; no partial result is returned.
pub fn load_releases(rows: Vec<Release>) -> Result<Vec<LoadedRelease>, LoadError> {
    let mut loaded = Vec::with_capacity(rows.len());

    for row in rows {
        let artifacts =
            ArtifactsDocument::from_json(&row.artifacts).map_err(|source| LoadError::Document {
                tag: row.tag.clone(),
                source,
            })?;

        if row.is_aggregated() {
            let views = split_release(&row, &artifacts);
            tracing::debug!("split {} into {} versions", row.tag, views.len());
            loaded.extend(views);
        } else {
            // Stored parts are kept; the version text decides how they were obtained.
            let version = if SemverParts::parse(&row.version).is_degraded() {
                Outcome::Degraded(row.semver())
            } else {
                Outcome::Resolved(row.semver())
            };
            loaded.push(LoadedRelease {
                release: row,
                artifacts,
                version,
            });
        }
    }

    Ok(loaded)
}

/// One view per listed version of an aggregated release.
pub fn split_release(row: &Release, artifacts: &ArtifactsDocument) -> Vec<LoadedRelease> {
    row.sub_versions()
        .into_iter()
        .map(|sub| {
            let version = SemverParts::parse(sub);
            if version.is_degraded() {
                tracing::warn!("{}: unparsable version {sub:?}, using 0.0.0", row.tag);
            }
            let parts = *version.value();

            let release = Release {
                version: sub.to_string(),
                major: parts.major,
                minor: parts.minor,
                patch: parts.patch,
                ..row.clone()
            };

            LoadedRelease {
                release,
                artifacts: filter_for_version(artifacts, sub),
                version,
            }
        })
        .collect()
}

/// Restrict `artifacts` to the platform entries belonging to `version`.
///
/// Common files and metadata are copied unchanged.
pub fn filter_for_version(artifacts: &ArtifactsDocument, version: &str) -> ArtifactsDocument {
    let platforms = artifacts
        .platforms
        .iter()
        .filter(|p| {
            p.binary
                .iter()
                .chain(&p.audit)
                .any(|f| mentions_version(&f.filename, version))
        })
        .map(|p| PlatformEntry {
            signature: p
                .signature
                .clone()
                .filter(|f| mentions_version(&f.filename, version)),
            certificate: p
                .certificate
                .clone()
                .filter(|f| mentions_version(&f.filename, version)),
            ..p.clone()
        })
        .collect();

    ArtifactsDocument {
        platforms,
        common_files: artifacts.common_files.clone(),
        metadata: artifacts.metadata.clone(),
    }
}

/// Whether `filename` contains `version` at a version boundary.
///
/// The character before the match must not continue a number (`digit` or
/// `.`), and the match must not be followed by a digit or by `.` plus a
/// digit. So `1.2.3` is found in `rt-v1.2.3.tar.gz` but not in `rt-v1.2.30`
/// or `rt-v11.2.3`.
pub fn mentions_version(filename: &str, version: &str) -> bool {
    if version.is_empty() {
        return false;
    }
    filename.match_indices(version).any(|(start, _)| {
        let before = filename[..start].chars().next_back();
        let mut after = filename[start + version.len()..].chars();
        let starts_clean = !before.is_some_and(|c| c.is_ascii_digit() || c == '.');
        let ends_clean = match after.next() {
            None => true,
            Some('.') => !after.next().is_some_and(|c| c.is_ascii_digit()),
            Some(c) => !c.is_ascii_digit(),
        };
        starts_clean && ends_clean
    })
}
