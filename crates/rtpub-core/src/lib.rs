//! rtpub core: from uploaded release files to a static download catalog.
//!
//! Publish side: [`classify`] and [`artifacts`] describe uploaded files,
//! [`publish`] pushes them through a [`host::ReleaseHost`] and records the
//! release in a [`store::ReleaseSink`].
//!
//! Generate side: [`loader`] parses and splits releases, [`site`] groups them,
//! and [`render`] writes both page trees through [`writer`]. [`pipeline`] ties
//! those phases together.
#![allow(clippy::missing_errors_doc)]

pub mod artifacts;
pub mod cancel;
pub mod classify;
pub mod config;
pub mod host;
pub mod loader;
pub mod paths;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod site;
pub mod store;
pub mod writer;

pub use artifacts::{UploadedFile, Verification, build_artifacts_document};
pub use cancel::CancelToken;
pub use config::Config;
pub use host::{DirectoryHost, ReleaseHost};
pub use loader::{LoadedRelease, load_releases};
pub use pipeline::{GenerateOptions, GenerateReport, PipelineError, generate_site};
pub use publish::{PublishRequest, publish};
pub use site::{SiteModel, build_site_model};
pub use store::{ReleaseDb, ReleaseSink, ReleaseSource, StoreError};
