//! Static rendering of the site model.
//!
//! Two independent trees are produced under the output root:
//!
//! ```text
//! index.html                                  human-browsable tree
//! <runtime>/index.html
//! <runtime>/<os>/index.html
//! <runtime>/<os>/v<major>/<version>/index.html
//! assets/style.css
//! simple/index.html                           link-only package index
//! simple/<runtime>/index.html
//! simple/<runtime>/v<major>/index.html
//! simple/<runtime>/v<major>/index.json
//! ```
//!
//! Every file goes through [`crate::writer::write_if_changed`], and pages carry
//! no generation timestamp, so re-rendering an unchanged model writes nothing.

pub mod pages;
pub mod simple;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use crate::cancel::CancelToken;
use crate::writer::{WriteStats, write_if_changed};

pub use pages::render_pages;
pub use simple::render_simple_index;

/// Errors raised while rendering one tree.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing an output file or creating its directory failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// Serializing a JSON index failed.
    #[error("failed to serialize {}: {source}", path.display())]
    Json {
        /// Target path.
        path: PathBuf,
        /// Underlying serialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// A runtime or OS name cannot be used as a directory name.
    #[error("invalid path segment {0:?}")]
    InvalidSegment(String),

    /// Rendering stopped at a cancellation checkpoint.
    #[error("rendering cancelled")]
    Cancelled,
}

/// Static files bundled with the generator.
#[derive(Debug)]
pub struct SiteAssets {
    /// Stylesheet written to `assets/style.css`.
    pub stylesheet: &'static str,
}

static SITE_ASSETS: OnceLock<SiteAssets> = OnceLock::new();

impl SiteAssets {
    /// The process-wide asset bundle, initialized on first use.
    pub fn get() -> &'static SiteAssets {
        SITE_ASSETS.get_or_init(|| SiteAssets {
            stylesheet: include_str!("../../assets/style.css"),
        })
    }
}

/// Shared inputs for both renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Output root directory.
    pub root: &'a Path,
    /// Bundled static assets.
    pub assets: &'a SiteAssets,
    /// Title shown on the human-readable root page.
    pub title: &'a str,
    /// Checked between runtimes.
    pub cancel: &'a CancelToken,
}

/// Writes files below the output root and tallies the outcomes.
#[derive(Debug)]
pub(crate) struct Output<'a> {
    root: &'a Path,
    stats: WriteStats,
}

impl<'a> Output<'a> {
    pub(crate) fn new(root: &'a Path) -> Self {
        Self {
            root,
            stats: WriteStats::default(),
        }
    }

    /// Write `content` at `segments` joined below the root.
    pub(crate) fn write(&mut self, segments: &[&str], content: &[u8]) -> Result<(), RenderError> {
        let mut path = self.root.to_path_buf();
        for segment in segments {
            path.push(segment);
        }
        let outcome =
            write_if_changed(&path, content).map_err(|source| RenderError::Write { path, source })?;
        self.stats.record(outcome);
        Ok(())
    }

    pub(crate) fn finish(self) -> WriteStats {
        self.stats
    }
}

/// Reject names that would escape or collapse the directory layout.
pub(crate) fn segment(name: &str) -> Result<&str, RenderError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(RenderError::InvalidSegment(name.to_string()));
    }
    Ok(name)
}

pub(crate) fn check_cancel(cancel: &CancelToken) -> Result<(), RenderError> {
    if cancel.is_cancelled() {
        Err(RenderError::Cancelled)
    } else {
        Ok(())
    }
}

const SIZE_UNITS: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Human-readable size with binary prefixes.
///
/// ```
/// use rtpub_core::render::human_size;
///
/// assert_eq!(human_size(512), "512 B");
/// assert_eq!(human_size(1536), "1.5 KiB");
/// assert_eq!(human_size(3 * 1024 * 1024), "3.0 MiB");
/// ```
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}iB", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size_boundaries() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1.0 KiB");
        assert_eq!(human_size(1024 * 1024 - 1), "1024.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn test_segment_rejects_traversal() {
        assert!(segment("nodejs").is_ok());
        assert!(segment("..").is_err());
        assert!(segment("a/b").is_err());
        assert!(segment("").is_err());
    }

    #[test]
    fn test_assets_initialized_once() {
        let a = SiteAssets::get();
        let b = SiteAssets::get();
        assert!(std::ptr::eq(a, b));
        assert!(a.stylesheet.contains("body"));
    }
}
