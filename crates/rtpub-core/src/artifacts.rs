//! Publish-time assembly of the artifacts document.
//!
//! Uploaded files are classified and grouped into platform entries keyed by
//! `(version, os, arch)`. The version is part of the key even though the
//! document only exposes the `os-arch` label, so an aggregated publish of
//! `22.15.0` and `22.14.0` keeps two separate `linux-x64` entries instead of
//! letting one overwrite the other.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rtpub_schema::{
    ArtifactFile, ArtifactsDocument, CommonFile, CommonFileType, DocumentMetadata, DownloadRecord,
    PlatformEntry, Sha256Hash, platform_label,
};

use crate::classify::{ArtifactKind, Coordinates, classify};

/// A file as reported by the release host after upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Public download URL.
    pub url: String,
    /// Content hash, if the host reported one.
    pub hash: Option<Sha256Hash>,
    /// Size in bytes.
    pub size: u64,
}

/// Outcome of upstream download verification, copied into the document metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verification {
    /// Binaries matched the upstream checksum listing.
    pub checksums_verified: bool,
    /// Upstream signatures were verified.
    pub signatures_verified: bool,
}

/// Build the artifacts document for a set of uploaded files.
///
/// `uploads` maps file names to what the host reported for them. Iteration
/// order of the input does not matter: files are processed by name.
pub fn build_artifacts_document<'a, I>(
    uploads: I,
    downloads: &[DownloadRecord],
    verification: Verification,
    uploaded_at: DateTime<Utc>,
) -> ArtifactsDocument
where
    I: IntoIterator<Item = (&'a String, &'a UploadedFile)>,
{
    let ordered: BTreeMap<&String, &UploadedFile> = uploads.into_iter().collect();

    let mut platforms: BTreeMap<Coordinates, PlatformEntry> = BTreeMap::new();
    let mut common_files = Vec::new();
    let mut total_size = 0u64;

    for (filename, upload) in &ordered {
        let classification = classify(filename, downloads).into_value();
        let kind = classification.kind;
        let size = classification.size.unwrap_or(upload.size);
        total_size += size;

        let Some(coords) = classification.coordinates.filter(|_| !kind.is_common()) else {
            let file_type = if kind == ArtifactKind::Checksums {
                CommonFileType::Checksums
            } else {
                CommonFileType::Other
            };
            common_files.push(CommonFile {
                file_type,
                filename: (*filename).clone(),
                size,
                url: upload.url.clone(),
                uploaded_at,
            });
            continue;
        };

        let file = ArtifactFile {
            filename: (*filename).clone(),
            size,
            hash: upload.hash.clone(),
            url: upload.url.clone(),
            uploaded_at,
        };

        let entry = platforms.entry(coords.clone()).or_insert_with(|| {
            PlatformEntry::empty(
                platform_label(&coords.os, &coords.arch),
                coords.os.clone(),
                coords.arch.clone(),
            )
        });

        let slot = match kind {
            ArtifactKind::Audit => &mut entry.audit,
            ArtifactKind::Signature => &mut entry.signature,
            ArtifactKind::Certificate => &mut entry.certificate,
            _ => &mut entry.binary,
        };
        if let Some(existing) = slot.as_ref() {
            tracing::warn!(
                "{} already holds {} for {} {}, ignoring {filename}",
                entry.platform,
                existing.filename,
                coords.version,
                entry.platform_os,
            );
        } else {
            *slot = Some(file);
        }
    }

    let platform_count = platforms.len();
    let platforms: Vec<PlatformEntry> = platforms.into_values().collect();
    let has_audits = platforms.iter().any(|p| p.audit.is_some());

    ArtifactsDocument {
        platforms,
        common_files,
        metadata: DocumentMetadata {
            artifact_count: ordered.len(),
            total_size,
            platform_count,
            checksums_verified: verification.checksums_verified,
            signatures_verified: verification.signatures_verified,
            has_audits,
        },
    }
}
