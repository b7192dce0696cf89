//! Change-detecting file output.
//!
//! Generated files are only written when their content differs from what is
//! already on disk, so regenerating an unchanged catalog leaves every file
//! (and its modification time) untouched and a later sync sees no diff.

use std::fs;
use std::io;
use std::path::Path;

use rtpub_schema::Sha256Hash;

/// Content up to this size is compared byte-for-byte; larger content by digest.
pub const INLINE_COMPARE_LIMIT: u64 = 64 * 1024;

/// What happened to a single output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist and was written.
    Created,
    /// The file existed with different content and was overwritten.
    Updated,
    /// The file already held identical content; nothing was written.
    Unchanged,
}

/// Running totals for one render stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Files newly created.
    pub created: usize,
    /// Files overwritten with new content.
    pub updated: usize,
    /// Files left untouched.
    pub unchanged: usize,
}

impl WriteStats {
    /// Number of files actually written.
    pub fn written(&self) -> usize {
        self.created + self.updated
    }

    /// Fold a single outcome into the totals.
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.created += 1,
            WriteOutcome::Updated => self.updated += 1,
            WriteOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Add another stage's totals to these.
    pub fn merge(&mut self, other: WriteStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
    }
}

/// Write `content` to `path` unless the file already holds exactly that content.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the existing
/// file cannot be read, or the write fails.
pub fn write_if_changed(path: &Path, content: &[u8]) -> io::Result<WriteOutcome> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let existing_len = match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        Ok(_) => None,
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let outcome = match existing_len {
        None => WriteOutcome::Created,
        Some(len) if len != content.len() as u64 => WriteOutcome::Updated,
        Some(len) if len <= INLINE_COMPARE_LIMIT => {
            if fs::read(path)? == content {
                WriteOutcome::Unchanged
            } else {
                WriteOutcome::Updated
            }
        }
        Some(_) => {
            let (on_disk, _) = Sha256Hash::of_reader(fs::File::open(path)?)?;
            if on_disk == Sha256Hash::of_bytes(content) {
                WriteOutcome::Unchanged
            } else {
                WriteOutcome::Updated
            }
        }
    };

    if outcome != WriteOutcome::Unchanged {
        fs::write(path, content)?;
        tracing::trace!("{outcome:?} {}", path.display());
    }
    Ok(outcome)
}
