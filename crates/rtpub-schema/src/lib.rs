//! Shared types and persisted formats for rtpub.
//!
//! Everything here is written once at publish time and read back, unchanged,
//! by every site generation run:
//!
//! - [`Release`]: one row of the release store.
//! - [`ArtifactsDocument`]: the JSON document stored alongside each release.
//! - [`DownloadRecord`]: an authoritative description of a verified download.

pub mod document;
pub mod download;
pub mod hash;
pub mod outcome;
pub mod platform;
pub mod release;

// Re-exports
pub use document::{
    ArtifactFile, ArtifactsDocument, CommonFile, CommonFileType, DocumentError, DocumentMetadata,
    PlatformEntry,
};
pub use download::DownloadRecord;
pub use hash::Sha256Hash;
pub use outcome::Outcome;
pub use platform::{normalize_os, os_rank, platform_label};
pub use release::{Release, SemverParts};
