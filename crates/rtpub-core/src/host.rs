//! Release hosting.
//!
//! A host owns the public location of release pages and their assets.
//! [`DirectoryHost`] is a local implementation: assets are copied into
//! `<root>/<tag>/<filename>` and served from `<base_url>/<tag>/<filename>`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use rtpub_schema::Sha256Hash;
use thiserror::Error;

use crate::artifacts::UploadedFile;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Release {0} already exists on the host")]
    ReleaseExists(String),

    #[error("Release {0} does not exist on the host")]
    UnknownRelease(String),

    #[error("Invalid name for a hosted path: {0:?}")]
    InvalidName(String),
}

/// A place releases are published to.
pub trait ReleaseHost {
    /// Create the release and return its public URL.
    fn create_release(&self, tag: &str, title: &str) -> Result<String, HostError>;

    /// Upload one asset to an existing release.
    fn upload_asset(&self, tag: &str, path: &Path) -> Result<UploadedFile, HostError>;

    /// Public URL of a release page.
    fn release_url(&self, tag: &str) -> String;

    /// Public URL of a release asset.
    fn asset_url(&self, tag: &str, filename: &str) -> String;
}

/// Hosts releases in a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    root: PathBuf,
    base_url: String,
}

impl DirectoryHost {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn release_dir(&self, tag: &str) -> Result<PathBuf, HostError> {
        Ok(self.root.join(checked_name(tag)?))
    }
}

fn checked_name(name: &str) -> Result<&str, HostError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(HostError::InvalidName(name.to_string()));
    }
    Ok(name)
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> HostError + '_ {
    move |source| HostError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Stream `path` through SHA-256, returning the digest and byte count.
pub fn hash_file(path: &Path) -> io::Result<(Sha256Hash, u64)> {
    Sha256Hash::of_reader(File::open(path)?)
}

impl ReleaseHost for DirectoryHost {
    fn create_release(&self, tag: &str, title: &str) -> Result<String, HostError> {
        let dir = self.release_dir(tag)?;
        fs::create_dir_all(&self.root).map_err(io_err(&self.root))?;
        // Exclusive create: an existing directory holds another release's assets
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(HostError::ReleaseExists(tag.to_string()));
            }
            Err(source) => return Err(HostError::Io { path: dir, source }),
        }
        tracing::info!("created release {tag} ({title}) at {}", dir.display());
        Ok(self.release_url(tag))
    }

    fn upload_asset(&self, tag: &str, path: &Path) -> Result<UploadedFile, HostError> {
        let dir = self.release_dir(tag)?;
        if !dir.is_dir() {
            return Err(HostError::UnknownRelease(tag.to_string()));
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| HostError::InvalidName(path.display().to_string()))?;
        let target = dir.join(checked_name(filename)?);

        let (hash, size) = hash_file(path).map_err(io_err(path))?;
        fs::copy(path, &target).map_err(io_err(&target))?;
        tracing::debug!("uploaded {filename} to {tag} ({size} bytes)");

        Ok(UploadedFile {
            url: self.asset_url(tag, filename),
            hash: Some(hash),
            size,
        })
    }

    fn release_url(&self, tag: &str) -> String {
        format!("{}/{tag}/", self.base_url)
    }

    fn asset_url(&self, tag: &str, filename: &str) -> String {
        format!("{}/{tag}/{filename}", self.base_url)
    }
}
