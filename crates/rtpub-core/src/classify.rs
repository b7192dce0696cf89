//! Filename classification for uploaded release files.
//!
//! Resolution order:
//!
//! 1. A checksum marker token (`SHASUMS256.txt`, `checksums.txt`) makes the file
//!    a release-wide checksum listing.
//! 2. A filename equal to the base name of a known [`DownloadRecord`] takes
//!    that record's coordinates verbatim. Sidecars (`.sig`, `.pem`,
//!    `.audit.json`) of such a file inherit the same coordinates.
//! 3. Otherwise the name is tokenized and searched for an OS token, the
//!    architecture token that follows it, and a `v`-prefixed version token.
//!
//! Classification never fails. Missing pieces come back empty and the result
//! is marked [`Outcome::Degraded`].

use rtpub_schema::platform::KNOWN_OS;
use rtpub_schema::{DownloadRecord, Outcome};

/// Tokens marking a checksum listing (matched case-insensitively).
const CHECKSUM_MARKERS: &[&str] = &["shasums", "checksums", "sha256sum"];

const SIGNATURE_SUFFIXES: &[&str] = &[".sig", ".asc", ".minisig"];
const CERTIFICATE_SUFFIXES: &[&str] = &[".pem", ".crt", ".cert"];
const AUDIT_SUFFIXES: &[&str] = &[".audit.json", ".sbom.json", ".intoto.jsonl"];

/// Archive and installer extensions stripped before tokenizing.
const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tar.xz", ".tar.zst", ".tar.bz2", ".tgz", ".txz", ".zip", ".7z", ".msi", ".pkg",
    ".exe", ".tar",
];

/// Semantic kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Release-wide checksum listing.
    Checksums,
    /// Runtime archive or executable.
    Binary,
    /// Audit / provenance record.
    Audit,
    /// Detached signature.
    Signature,
    /// Signing certificate.
    Certificate,
    /// Could not be placed on any platform.
    Unknown,
}

impl ArtifactKind {
    /// Whether files of this kind are release-wide rather than per-platform.
    pub fn is_common(self) -> bool {
        matches!(self, Self::Checksums | Self::Unknown)
    }
}

/// Platform coordinates of a classified file. Fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinates {
    /// Operating system as written in the filename or record.
    pub os: String,
    /// CPU architecture.
    pub arch: String,
    /// Runtime version, without a `v` prefix.
    pub version: String,
}

/// Result of classifying one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// What kind of file this is.
    pub kind: ArtifactKind,
    /// Platform coordinates, absent for common files.
    pub coordinates: Option<Coordinates>,
    /// Size from the authoritative record, when one matched.
    pub size: Option<u64>,
}

impl Classification {
    fn common(kind: ArtifactKind) -> Self {
        Self {
            kind,
            coordinates: None,
            size: None,
        }
    }
}

/// Strip `suffix` from the end of `name`, ignoring ASCII case.
fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    let tail = name.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &name[..split])
}

fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
    suffixes
        .iter()
        .any(|s| strip_suffix_ignore_case(name, s).is_some())
}

/// Kind implied by a sidecar suffix, or [`ArtifactKind::Binary`] if none matches.
pub fn kind_from_suffix(filename: &str) -> ArtifactKind {
    if has_suffix(filename, AUDIT_SUFFIXES) {
        ArtifactKind::Audit
    } else if has_suffix(filename, SIGNATURE_SUFFIXES) {
        ArtifactKind::Signature
    } else if has_suffix(filename, CERTIFICATE_SUFFIXES) {
        ArtifactKind::Certificate
    } else {
        ArtifactKind::Binary
    }
}

/// Strip a sidecar suffix (signature, certificate, audit) if present.
fn strip_sidecar(filename: &str) -> &str {
    AUDIT_SUFFIXES
        .iter()
        .chain(SIGNATURE_SUFFIXES)
        .chain(CERTIFICATE_SUFFIXES)
        .find_map(|s| strip_suffix_ignore_case(filename, s))
        .unwrap_or(filename)
}

fn strip_archive_extension(name: &str) -> &str {
    ARCHIVE_EXTENSIONS
        .iter()
        .find_map(|ext| strip_suffix_ignore_case(name, ext))
        .unwrap_or(name)
}

fn is_checksum_file(filename: &str) -> bool {
    let f = filename.to_lowercase();
    CHECKSUM_MARKERS.iter().any(|m| f.contains(m))
}

fn os_and_arch(tokens: &[String]) -> Option<(String, String)> {
    let os_index = tokens.iter().position(|t| KNOWN_OS.contains(&t.as_str()))?;
    let arch = tokens.get(os_index + 1).cloned().unwrap_or_default();
    Some((tokens[os_index].clone(), arch))
}

fn tokenize(stem: &str, separators: &[char]) -> Vec<String> {
    stem.split(separators)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Heuristic coordinates from the filename alone.
///
/// Dashes are tried first so `x86_64` survives as one token; underscores are
/// only treated as separators when no OS token appears between dashes.
/// Returns `None` if no OS token is present.
fn coordinates_from_name(filename: &str) -> Option<Coordinates> {
    let stem = strip_archive_extension(strip_sidecar(filename));
    let (os, arch) = os_and_arch(&tokenize(stem, &['-']))
        .or_else(|| os_and_arch(&tokenize(stem, &['-', '_'])))?;

    let version = stem
        .split('-')
        .find_map(|t| {
            let rest = t.strip_prefix('v').or_else(|| t.strip_prefix('V'))?;
            rest.starts_with(|c: char| c.is_ascii_digit())
                .then(|| rest.to_string())
        })
        .unwrap_or_default();

    Some(Coordinates { os, arch, version })
}

/// Classify `filename` against the known download records.
pub fn classify(filename: &str, downloads: &[DownloadRecord]) -> Outcome<Classification> {
    if is_checksum_file(filename) {
        return Outcome::Resolved(Classification::common(ArtifactKind::Checksums));
    }

    let kind = kind_from_suffix(filename);
    let subject = strip_sidecar(filename);

    if let Some(record) = downloads.iter().find(|r| r.file_name() == subject) {
        return Outcome::Resolved(Classification {
            kind,
            coordinates: Some(Coordinates {
                os: record.os.clone(),
                arch: record.arch.clone(),
                version: record.version.clone(),
            }),
            size: (kind == ArtifactKind::Binary).then_some(record.size),
        });
    }

    match coordinates_from_name(filename) {
        Some(coords) => {
            let complete = !coords.arch.is_empty() && !coords.version.is_empty();
            let classification = Classification {
                kind,
                coordinates: Some(coords),
                size: None,
            };
            if complete {
                Outcome::Resolved(classification)
            } else {
                tracing::debug!("partial platform coordinates for {filename}");
                Outcome::Degraded(classification)
            }
        }
        None => {
            tracing::debug!("unclassifiable file {filename}");
            Outcome::Degraded(Classification::common(ArtifactKind::Unknown))
        }
    }
}
