//! Generate command

use std::path::Path;

use anyhow::{Context, Result};
use rtpub_core::{CancelToken, Config, GenerateOptions, ReleaseDb, generate_site};

/// Render the catalog from the release store
pub fn generate(config: &Config, output: Option<&Path>) -> Result<()> {
    let db = ReleaseDb::open(&config.database).with_context(|| {
        format!("Failed to open release database {}", config.database.display())
    })?;
    let output = output.unwrap_or(&config.output_dir);

    let options = GenerateOptions {
        site_title: config.site_title.clone(),
    };
    let report = generate_site(&db, output, &options, &CancelToken::new())
        .with_context(|| format!("Failed to generate site in {}", output.display()))?;

    let total = report.total();
    println!(
        "Generated {} runtimes from {} releases ({} versions) in {}",
        report.runtimes,
        report.releases,
        report.views,
        output.display()
    );
    println!(
        "  {} created, {} updated, {} unchanged",
        total.created, total.updated, total.unchanged
    );
    Ok(())
}
