//! Publishing a release: upload files, describe them, record the row.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rtpub_schema::{DownloadRecord, Release, SemverParts};
use thiserror::Error;

use crate::artifacts::{UploadedFile, Verification, build_artifacts_document};
use crate::host::{HostError, ReleaseHost};
use crate::store::{ReleaseSink, StoreError};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("At least one version is required")]
    NoVersions,

    #[error("Two files share the name {0}")]
    DuplicateFile(String),

    #[error("Not a file name: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Failed to read download records {}: {source}", path.display())]
    Downloads {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to serialize artifacts document: {0}")]
    Document(#[from] rtpub_schema::DocumentError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything needed to publish one release.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    /// Runtime name.
    pub runtime: String,
    /// Versions contained in this release; several make it aggregated.
    pub versions: Vec<String>,
    /// Unique release tag.
    pub tag: String,
    /// Local files to upload.
    pub files: Vec<PathBuf>,
    /// Authoritative coordinates for downloaded binaries.
    pub downloads: Vec<DownloadRecord>,
    /// Upstream verification results.
    pub verification: Verification,
}

/// Read download records from a JSON array file.
pub fn read_download_records(path: &Path) -> Result<Vec<DownloadRecord>, PublishError> {
    let wrap = |source: Box<dyn std::error::Error + Send + Sync>| PublishError::Downloads {
        path: path.to_path_buf(),
        source,
    };
    let content = std::fs::read_to_string(path).map_err(|e| wrap(Box::new(e)))?;
    serde_json::from_str(&content).map_err(|e| wrap(Box::new(e)))
}

/// Upload `request.files` through `host` and record the release in `sink`.
///
/// Version parts come from the first listed version; an unparsable version
/// is recorded as `0.0.0` with a warning.
pub fn publish<H, S>(
    host: &H,
    sink: &S,
    request: &PublishRequest,
    now: DateTime<Utc>,
) -> Result<Release, PublishError>
where
    H: ReleaseHost + ?Sized,
    S: ReleaseSink + ?Sized,
{
    let first = request.versions.first().ok_or(PublishError::NoVersions)?;
    let joined = request.versions.join(", ");

    let parsed = SemverParts::parse(first);
    if parsed.is_degraded() {
        tracing::warn!("version {first:?} is not semver, recording as 0.0.0");
    }
    let parts = parsed.into_value();

    // Reject name clashes before anything is uploaded.
    let mut names = BTreeMap::new();
    for path in &request.files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PublishError::InvalidPath(path.clone()))?
            .to_string();
        if names.insert(name.clone(), path).is_some() {
            return Err(PublishError::DuplicateFile(name));
        }
    }

    // Checked before the host is touched.
    if sink.contains_tag(&request.tag)? {
        return Err(StoreError::DuplicateTag(request.tag.clone()).into());
    }

    let title = format!("{} {joined}", request.runtime);
    let url = host.create_release(&request.tag, &title)?;

    let mut uploads: BTreeMap<String, UploadedFile> = BTreeMap::new();
    for (name, path) in names {
        let uploaded = host.upload_asset(&request.tag, path)?;
        uploads.insert(name, uploaded);
    }

    let document =
        build_artifacts_document(&uploads, &request.downloads, request.verification, now);
    tracing::info!(
        "{}: {} artifacts across {} platforms",
        request.tag,
        document.metadata.artifact_count,
        document.metadata.platform_count
    );

    let release = Release {
        runtime: request.runtime.clone(),
        version: joined,
        major: parts.major,
        minor: parts.minor,
        patch: parts.patch,
        tag: request.tag.clone(),
        url,
        created_at: now,
        artifacts: document.to_json()?,
    };
    sink.insert_release(&release)?;
    Ok(release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DirectoryHost;
    use crate::store::ReleaseDb;
    use chrono::TimeZone;
    use rtpub_schema::ArtifactsDocument;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_publish_aggregated_release() {
        let src = tempdir().unwrap();
        let root = tempdir().unwrap();
        let files: Vec<PathBuf> = [
            "node-v22.15.0-linux-x64.tar.xz",
            "node-v22.14.0-linux-x64.tar.xz",
            "SHASUMS256.txt",
        ]
        .iter()
        .map(|name| {
            let p = src.path().join(name);
            std::fs::write(&p, name.as_bytes()).unwrap();
            p
        })
        .collect();

        let host = DirectoryHost::new(root.path(), "https://files.example.com");
        let db = ReleaseDb::open_in_memory().unwrap();
        let request = PublishRequest {
            runtime: "nodejs".into(),
            versions: vec!["22.15.0".into(), "22.14.0".into()],
            tag: "nodejs-22".into(),
            files,
            verification: Verification {
                checksums_verified: true,
                signatures_verified: false,
            },
            ..PublishRequest::default()
        };

        let release = publish(&host, &db, &request, now()).unwrap();
        assert_eq!(release.version, "22.15.0, 22.14.0");
        assert_eq!((release.major, release.minor, release.patch), (22, 15, 0));

        let stored = db.get_by_tag("nodejs-22").unwrap().unwrap();
        let doc = ArtifactsDocument::from_json(&stored.artifacts).unwrap();
        assert_eq!(doc.metadata.artifact_count, 3);
        assert_eq!(doc.platforms.len(), 2);
        assert_eq!(doc.common_files.len(), 1);
        assert!(doc.metadata.checksums_verified);
    }

    #[test]
    fn test_unparsable_version_degrades() {
        let root = tempdir().unwrap();
        let host = DirectoryHost::new(root.path(), "https://files.example.com");
        let db = ReleaseDb::open_in_memory().unwrap();
        let request = PublishRequest {
            runtime: "nodejs".into(),
            versions: vec!["nightly".into()],
            tag: "nodejs-nightly".into(),
            ..PublishRequest::default()
        };
        let release = publish(&host, &db, &request, now()).unwrap();
        assert_eq!((release.major, release.minor, release.patch), (0, 0, 0));
    }

    #[test]
    fn test_duplicate_tag_keeps_hosted_assets() {
        let src = tempdir().unwrap();
        let root = tempdir().unwrap();
        let file = src.path().join("node-v22.15.0-linux-x64.tar.xz");
        std::fs::write(&file, b"original").unwrap();

        let host = DirectoryHost::new(root.path(), "https://files.example.com");
        let db = ReleaseDb::open_in_memory().unwrap();
        let request = PublishRequest {
            runtime: "nodejs".into(),
            versions: vec!["22.15.0".into()],
            tag: "t".into(),
            files: vec![file.clone()],
            ..PublishRequest::default()
        };
        publish(&host, &db, &request, now()).unwrap();

        std::fs::write(&file, b"REPLACED").unwrap();
        let err = publish(&host, &db, &request, now()).unwrap_err();
        assert!(matches!(err, PublishError::Store(StoreError::DuplicateTag(tag)) if tag == "t"));

        let hosted = std::fs::read(root.path().join("t/node-v22.15.0-linux-x64.tar.xz")).unwrap();
        assert_eq!(hosted, b"original");
    }

    #[test]
    fn test_existing_host_release_is_rejected() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("t")).unwrap();

        let host = DirectoryHost::new(root.path(), "https://files.example.com");
        let db = ReleaseDb::open_in_memory().unwrap();
        let request = PublishRequest {
            runtime: "nodejs".into(),
            versions: vec!["22.15.0".into()],
            tag: "t".into(),
            ..PublishRequest::default()
        };
        let err = publish(&host, &db, &request, now()).unwrap_err();
        assert!(matches!(err, PublishError::Host(HostError::ReleaseExists(_))));
        assert!(!db.contains_tag("t").unwrap());
    }

    #[test]
    fn test_requires_versions() {
        let root = tempdir().unwrap();
        let host = DirectoryHost::new(root.path(), "https://files.example.com");
        let db = ReleaseDb::open_in_memory().unwrap();
        let err = publish(&host, &db, &PublishRequest::default(), now()).unwrap_err();
        assert!(matches!(err, PublishError::NoVersions));
    }

    #[test]
    fn test_read_download_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("downloads.json");
        std::fs::write(
            &path,
            r#"[{"os":"linux","arch":"x64","version":"22.15.0","size":10,"path":"/tmp/node.tar.xz"}]"#,
        )
        .unwrap();
        let records = read_download_records(&path).unwrap();
        assert_eq!(records[0].file_name(), "node.tar.xz");
    }
}
