//! The artifacts document persisted with every release.
//!
//! ```text
//! {
//!   "platforms":    [ { "platform": "linux-x64", "platform_os": "linux",
//!                       "platform_arch": "x64", "binary": {..}, "signature": {..} } ],
//!   "common_files": [ { "type": "checksums", "filename": "SHASUMS256.txt", .. } ],
//!   "metadata":     { "artifact_count": 3, "total_size": 1024, "platform_count": 1, .. }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hash::Sha256Hash;

/// Errors reading or writing an [`ArtifactsDocument`].
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The stored JSON does not match the document schema.
    #[error("Malformed artifacts document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One uploaded file attached to a platform entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    /// File name as uploaded.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Content hash reported by the host, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Sha256Hash>,
    /// Public download URL.
    pub url: String,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}

/// Files for a single OS/architecture pair.
///
/// Holds at most one file of each kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// `os-arch` label, e.g. `linux-x64`.
    pub platform: String,
    /// Operating system as classified (not normalized).
    pub platform_os: String,
    /// CPU architecture as classified.
    pub platform_arch: String,
    /// The runtime archive or executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<ArtifactFile>,
    /// Audit / provenance record for the binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<ArtifactFile>,
    /// Detached signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<ArtifactFile>,
    /// Signing certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<ArtifactFile>,
}

impl PlatformEntry {
    /// An entry with no files yet.
    pub fn empty(platform: String, os: String, arch: String) -> Self {
        Self {
            platform,
            platform_os: os,
            platform_arch: arch,
            binary: None,
            audit: None,
            signature: None,
            certificate: None,
        }
    }

    /// All files present on this entry, binary first.
    pub fn files(&self) -> impl Iterator<Item = &ArtifactFile> {
        [&self.binary, &self.audit, &self.signature, &self.certificate]
            .into_iter()
            .flatten()
    }
}

/// Kind of a release-wide file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommonFileType {
    /// A checksum listing (e.g. `SHASUMS256.txt`).
    Checksums,
    /// A file that could not be classified.
    Other,
}

/// A file that is not tied to a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFile {
    /// What kind of file this is.
    #[serde(rename = "type")]
    pub file_type: CommonFileType,
    /// File name as uploaded.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Public download URL.
    pub url: String,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}

/// Summary of an artifacts document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Number of uploaded files.
    pub artifact_count: usize,
    /// Sum of all file sizes in bytes.
    pub total_size: u64,
    /// Number of distinct platform entries.
    pub platform_count: usize,
    /// Binaries were checked against the upstream checksum listing.
    #[serde(default)]
    pub checksums_verified: bool,
    /// Upstream signatures were verified.
    #[serde(default)]
    pub signatures_verified: bool,
    /// At least one audit record is attached.
    #[serde(default)]
    pub has_audits: bool,
}

/// The structured description of every file attached to a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsDocument {
    /// Per-platform file groups.
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
    /// Files shared by all platforms.
    #[serde(default)]
    pub common_files: Vec<CommonFile>,
    /// Counts, sizes, and verification flags.
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl ArtifactsDocument {
    /// Parse a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the JSON does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if serialization fails.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }
}
