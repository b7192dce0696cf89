//! Site generation: load → build → human tree → simple tree.
//!
//! Cancellation is checked between phases and between runtimes inside each
//! renderer. A failing or cancelled human tree leaves the simple tree alone,
//! since the two are independent outputs.

use std::path::Path;

use thiserror::Error;

use crate::cancel::CancelToken;
use crate::config::DEFAULT_SITE_TITLE;
use crate::loader::{LoadError, load_releases};
use crate::render::{RenderContext, RenderError, SiteAssets, render_pages, render_simple_index};
use crate::site::build_site_model;
use crate::store::{ReleaseSource, StoreError};
use crate::writer::WriteStats;

/// Generation failed; the variant names the phase.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the release snapshot from the store failed.
    #[error("failed to read releases: {0}")]
    Source(#[from] StoreError),

    /// A release could not be parsed.
    #[error("failed to load releases: {0}")]
    Load(#[from] LoadError),

    /// Rendering the human-readable tree failed.
    #[error("failed to render pages: {0}")]
    HumanTree(#[source] RenderError),

    /// Rendering the simple index failed.
    #[error("failed to render simple index: {0}")]
    SimpleTree(#[source] RenderError),

    /// Cancellation was requested.
    #[error("generation cancelled")]
    Cancelled,
}

impl PipelineError {
    fn from_render(err: RenderError, wrap: fn(RenderError) -> Self) -> Self {
        match err {
            RenderError::Cancelled => Self::Cancelled,
            other => wrap(other),
        }
    }
}

/// Options for [`generate_site`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Title of the human-readable root page.
    pub site_title: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            site_title: DEFAULT_SITE_TITLE.to_string(),
        }
    }
}

/// What a generation run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Release rows read from the source.
    pub releases: usize,
    /// Per-version views after splitting aggregated releases.
    pub views: usize,
    /// Runtimes in the site model.
    pub runtimes: usize,
    /// Human-readable tree writes.
    pub pages: WriteStats,
    /// Simple index writes.
    pub simple: WriteStats,
}

impl GenerateReport {
    /// Writes across both trees.
    pub fn total(&self) -> WriteStats {
        let mut total = self.pages;
        total.merge(self.simple);
        total
    }
}

fn checkpoint(cancel: &CancelToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        tracing::info!("generation cancelled");
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Generate the full static site below `output_root`.
///
/// # Errors
///
/// Returns [`PipelineError`] naming the phase that failed. Files written
/// before the failure stay in place.
pub fn generate_site<S>(
    source: &S,
    output_root: &Path,
    options: &GenerateOptions,
    cancel: &CancelToken,
) -> Result<GenerateReport, PipelineError>
where
    S: ReleaseSource + ?Sized,
{
    checkpoint(cancel)?;
    let rows = source.releases()?;
    let releases = rows.len();
    let loaded = load_releases(rows)?;
    tracing::info!("loaded {releases} releases ({} versions)", loaded.len());

    checkpoint(cancel)?;
    let model = build_site_model(&loaded);
    tracing::debug!("site model has {} runtimes", model.runtimes.len());

    let ctx = RenderContext {
        root: output_root,
        assets: SiteAssets::get(),
        title: &options.site_title,
        cancel,
    };

    checkpoint(cancel)?;
    let pages = render_pages(&model, &ctx)
        .map_err(|e| PipelineError::from_render(e, PipelineError::HumanTree))?;
    tracing::info!(
        "pages: {} created, {} updated, {} unchanged",
        pages.created,
        pages.updated,
        pages.unchanged
    );

    checkpoint(cancel)?;
    let simple = render_simple_index(&model, &ctx)
        .map_err(|e| PipelineError::from_render(e, PipelineError::SimpleTree))?;
    tracing::info!(
        "simple index: {} created, {} updated, {} unchanged",
        simple.created,
        simple.updated,
        simple.unchanged
    );

    Ok(GenerateReport {
        releases,
        views: loaded.len(),
        runtimes: model.runtimes.len(),
        pages,
        simple,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtpub_schema::Release;
    use tempfile::tempdir;

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempdir().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let rows: Vec<Release> = Vec::new();
        let err = generate_site(&rows, dir.path(), &GenerateOptions::default(), &cancel)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
        assert!(!dir.path().join("index.html").exists());
    }

    #[test]
    fn test_render_cancel_maps_to_cancelled() {
        let err = PipelineError::from_render(RenderError::Cancelled, PipelineError::HumanTree);
        assert!(matches!(err, PipelineError::Cancelled));
        let err = PipelineError::from_render(
            RenderError::InvalidSegment("..".into()),
            PipelineError::SimpleTree,
        );
        assert!(matches!(err, PipelineError::SimpleTree(_)));
    }

    #[test]
    fn test_empty_source_renders_roots() {
        let dir = tempdir().unwrap();
        let rows: Vec<Release> = Vec::new();
        let report =
            generate_site(&rows, dir.path(), &GenerateOptions::default(), &CancelToken::new())
                .unwrap();
        assert_eq!(report.runtimes, 0);
        assert_eq!(report.pages.created, 2);
        assert_eq!(report.simple.created, 1);
        assert!(dir.path().join("simple/index.html").exists());
    }
}
