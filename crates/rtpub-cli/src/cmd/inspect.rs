//! Inspect command

use anyhow::{Context, Result, bail};
use rtpub_core::loader::load_releases;
use rtpub_core::{Config, ReleaseDb};
use rtpub_schema::ArtifactsDocument;

/// Print the stored artifacts document of a release and its per-version views
pub fn inspect(config: &Config, tag: &str) -> Result<()> {
    let db = ReleaseDb::open(&config.database).context("Failed to open release database")?;
    let Some(release) = db.get_by_tag(tag)? else {
        bail!("Release '{tag}' not found");
    };

    let lw = 10;
    println!();
    println!("  {:<lw$}{}", "runtime", release.runtime);
    println!("  {:<lw$}{}", "version", release.version);
    println!("  {:<lw$}{}", "url", release.url);
    println!("  {:<lw$}{}", "published", release.created_at.to_rfc3339());
    println!();

    let stored = release.artifacts.clone();
    let views = load_releases(vec![release]).context("Failed to parse artifacts document")?;
    for view in &views {
        println!("  {} {}", view.release.version, view.release.tag);
        if view.version.is_degraded() {
            println!("    (version could not be parsed)");
        }
        for entry in &view.artifacts.platforms {
            let files: Vec<&str> = entry.files().map(|f| f.filename.as_str()).collect();
            println!("    {:<16}{}", entry.platform, files.join(", "));
        }
        for file in &view.artifacts.common_files {
            println!("    {:<16}{}", "common", file.filename);
        }
    }

    println!();
    let stored = ArtifactsDocument::from_json(&stored)?;
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}
