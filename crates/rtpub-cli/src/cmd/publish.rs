//! Publish command

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rtpub_core::artifacts::Verification;
use rtpub_core::publish::read_download_records;
use rtpub_core::{Config, DirectoryHost, PublishRequest, ReleaseDb, publish as publish_release};

/// Arguments of `rtpub publish`
#[derive(Debug)]
pub struct PublishArgs {
    pub runtime: String,
    pub versions: Vec<String>,
    pub tag: String,
    pub downloads: Option<PathBuf>,
    pub checksums_verified: bool,
    pub signatures_verified: bool,
    pub files: Vec<PathBuf>,
}

/// Expand directories into the regular files below them, sorted.
fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in walkdir::WalkDir::new(input) {
                let entry =
                    entry.with_context(|| format!("Failed to read {}", input.display()))?;
                if entry.file_type().is_file() {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("No such file: {}", input.display());
        }
    }
    Ok(files)
}

/// Upload files through the configured host and record the release
pub fn publish(config: &Config, args: PublishArgs) -> Result<()> {
    let files = collect_files(&args.files)?;
    if files.is_empty() {
        bail!("Nothing to publish");
    }

    let downloads = match args.downloads.as_deref() {
        Some(path) => read_download_records(path)?,
        None => Vec::new(),
    };

    let db = ReleaseDb::open(&config.database).context("Failed to open release database")?;
    let host = DirectoryHost::new(config.host.root.clone(), &config.host.base_url);

    let request = PublishRequest {
        runtime: args.runtime,
        versions: args.versions,
        tag: args.tag,
        files,
        downloads,
        verification: Verification {
            checksums_verified: args.checksums_verified,
            signatures_verified: args.signatures_verified,
        },
    };

    let release = publish_release(&host, &db, &request, chrono::Utc::now())
        .with_context(|| format!("Failed to publish {}", request.tag))?;

    println!(
        "Published {} {} as {} ({} files)",
        release.runtime,
        release.version,
        release.tag,
        request.files.len()
    );
    println!("  {}", release.url);
    tracing::debug!("assets stored under {}", host.root().display());
    Ok(())
}
