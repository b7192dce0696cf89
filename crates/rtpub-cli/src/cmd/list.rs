use anyhow::{Context, Result};
use comfy_table::{Table, presets::UTF8_FULL};
use rtpub_core::render::human_size;
use rtpub_core::{Config, ReleaseDb};
use rtpub_schema::ArtifactsDocument;

/// List recorded releases
pub fn list(config: &Config) -> Result<()> {
    let db = ReleaseDb::open(&config.database).context("Failed to open release database")?;
    let releases = db.releases()?;

    if releases.is_empty() {
        println!();
        println!("  No releases recorded.");
        println!("  Run 'rtpub publish' to record one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Runtime", "Version", "Tag", "Published", "Files", "Size"]);

    for release in &releases {
        // A bad document should not hide the rest of the listing
        let (files, size) = match ArtifactsDocument::from_json(&release.artifacts) {
            Ok(doc) => (
                doc.metadata.artifact_count.to_string(),
                human_size(doc.metadata.total_size),
            ),
            Err(e) => {
                tracing::warn!("{}: {e}", release.tag);
                ("?".to_string(), "?".to_string())
            }
        };
        table.add_row(vec![
            release.runtime.clone(),
            release.version.clone(),
            release.tag.clone(),
            release.created_at.format("%Y-%m-%d %H:%M").to_string(),
            files,
            size,
        ]);
    }

    println!("{table}");
    Ok(())
}
