//! rtpub - runtime release publisher
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Publishes runtime binaries to a release host, records each release in a
//! local SQLite store, and generates a static download catalog from the store.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.rtpub/
//! ├── rtpub.toml   # Optional configuration
//! ├── releases.db  # SQLite release store
//! ├── mirror/      # Local release host (one directory per tag)
//! └── site/        # Generated catalog
//! ```

pub mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rtpub_core::Config;

#[derive(Debug, Parser)]
#[command(name = "rtpub")]
#[command(author, version, about = "rtpub - runtime release publisher")]
pub struct Cli {
    /// Config file (defaults to ~/.rtpub/rtpub.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Release database path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the static catalog from the release store
    Generate {
        /// Output directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload files as a new release and record it
    Publish {
        /// Runtime name (e.g. nodejs)
        #[arg(long)]
        runtime: String,
        /// Version(s) contained in the release; repeat for an aggregated release
        #[arg(long = "version", required = true)]
        versions: Vec<String>,
        /// Unique release tag
        #[arg(long)]
        tag: String,
        /// JSON file with download records for authoritative classification
        #[arg(long)]
        downloads: Option<PathBuf>,
        /// Binaries were checked against upstream checksums
        #[arg(long)]
        checksums_verified: bool,
        /// Upstream signatures were verified
        #[arg(long)]
        signatures_verified: bool,
        /// Files or directories to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List recorded releases
    List,
    /// Show the artifacts recorded for a release
    Inspect {
        /// Release tag
        tag: String,
    },
}

impl Cli {
    /// Resolve configuration: defaults, file, environment, then flags.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load config")?;
        if let Some(db) = &self.database {
            config.database.clone_from(db);
        }
        Ok(config)
    }
}
