//! Human-browsable page tree.

use maud::{DOCTYPE, Markup, html};
use rtpub_schema::ArtifactFile;

use super::{Output, RenderContext, RenderError, check_cancel, human_size, segment};
use crate::site::{OsNode, ReleaseView, RuntimeNode, SiteModel, VersionNode};
use crate::writer::WriteStats;

/// Render the human-readable tree and the stylesheet.
///
/// # Errors
///
/// Returns [`RenderError`] if a file cannot be written, a runtime or OS name is
/// not a valid directory name, or the cancel token fires between runtimes.
pub fn render_pages(model: &SiteModel, ctx: &RenderContext<'_>) -> Result<WriteStats, RenderError> {
    let mut out = Output::new(ctx.root);

    out.write(&["assets", "style.css"], ctx.assets.stylesheet.as_bytes())?;
    out.write(&["index.html"], root_page(model, ctx.title).into_string().as_bytes())?;

    for runtime in &model.runtimes {
        check_cancel(ctx.cancel)?;
        let name = segment(&runtime.name)?;
        tracing::debug!("rendering pages for {name}");

        out.write(&[name, "index.html"], runtime_page(runtime).into_string().as_bytes())?;

        for os in &runtime.platforms {
            let os_dir = segment(&os.os)?;
            out.write(
                &[name, os_dir, "index.html"],
                os_page(runtime, os).into_string().as_bytes(),
            )?;

            for version in &os.versions {
                let major_dir = format!("v{}", version.major);
                out.write(
                    &[name, os_dir, &major_dir, &version.version, "index.html"],
                    version_page(runtime, os, version).into_string().as_bytes(),
                )?;
            }
        }
    }

    Ok(out.finish())
}

fn layout(title: &str, depth: usize, crumbs: &[(&str, String)], body: Markup) -> Markup {
    let prefix = "../".repeat(depth);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href=(format!("{prefix}assets/style.css"));
            }
            body {
                @if !crumbs.is_empty() {
                    nav.crumbs {
                        @for (label, href) in crumbs {
                            a href=(href) { (label) } " / "
                        }
                    }
                }
                (body)
            }
        }
    }
}

fn latest(os: &OsNode) -> Option<&VersionNode> {
    os.versions.first()
}

fn root_page(model: &SiteModel, title: &str) -> Markup {
    layout(
        title,
        0,
        &[],
        html! {
            h1 { (title) }
            @if model.runtimes.is_empty() {
                p { "No runtimes have been published yet." }
            } @else {
                ul.listing {
                    @for runtime in &model.runtimes {
                        li {
                            a href=(format!("{}/", runtime.name)) { (runtime.name) }
                            span.meta {
                                @for os in &runtime.platforms {
                                    span.badge { (os.os) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn runtime_page(runtime: &RuntimeNode) -> Markup {
    layout(
        &runtime.name,
        1,
        &[("home", "../".to_string())],
        html! {
            h1 { (runtime.name) }
            ul.listing {
                @for os in &runtime.platforms {
                    li {
                        a href=(format!("{}/", os.os)) { (os.os) }
                        span.meta { (os.versions.len()) " versions" }
                        @if let Some(v) = latest(os) {
                            span.meta {
                                "latest "
                                a href=(format!("{}/v{}/{}/", os.os, v.major, v.version)) { (v.version) }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn os_page(runtime: &RuntimeNode, os: &OsNode) -> Markup {
    layout(
        &format!("{} for {}", runtime.name, os.os),
        2,
        &[
            ("home", "../../".to_string()),
            (runtime.name.as_str(), "../".to_string()),
        ],
        html! {
            h1 { (runtime.name) " for " (os.os) }
            @for (major, versions) in os.by_major() {
                h2 id=(format!("v{major}")) { "v" (major) }
                ul.listing {
                    @for v in versions {
                        li {
                            a href=(format!("v{}/{}/", v.major, v.version)) { (v.version) }
                            span.meta {
                                (v.releases.len())
                                @if v.releases.len() == 1 { " release" } @else { " releases" }
                            }
                            @if let Some(r) = v.releases.first() {
                                span.meta { (r.release.created_at.format("%Y-%m-%d").to_string()) }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn file_link(file: Option<&ArtifactFile>) -> Markup {
    html! {
        @if let Some(f) = file {
            a href=(f.url) { (f.filename) }
        } @else {
            "-"
        }
    }
}

fn release_section(view: &ReleaseView) -> Markup {
    let release = &view.release;
    html! {
        h2 id=(release.tag) {
            a href=(release.url) { (release.tag) }
        }
        p {
            span.badge { (release.version) }
            "published " (release.created_at.format("%Y-%m-%d %H:%M UTC").to_string())
        }
        table.artifacts {
            thead {
                tr {
                    th { "Platform" }
                    th { "File" }
                    th { "Size" }
                    th { "SHA-256" }
                    th { "Signature" }
                    th { "Certificate" }
                    th { "Audit" }
                }
            }
            tbody {
                @for entry in &view.artifacts {
                    @if let Some(binary) = &entry.binary {
                        tr {
                            td { (entry.platform) }
                            td { a href=(binary.url) { (binary.filename) } }
                            td.size { (human_size(binary.size)) }
                            td {
                                @if let Some(hash) = &binary.hash {
                                    code.hash { (hash.as_str()) }
                                }
                            }
                            td { (file_link(entry.signature.as_ref())) }
                            td { (file_link(entry.certificate.as_ref())) }
                            td { (file_link(entry.audit.as_ref())) }
                        }
                    }
                }
            }
        }
        @if !view.common_files.is_empty() {
            ul.listing {
                @for file in &view.common_files {
                    li {
                        a href=(file.url) { (file.filename) }
                        span.meta { (human_size(file.size)) }
                    }
                }
            }
        }
    }
}

fn version_page(runtime: &RuntimeNode, os: &OsNode, version: &VersionNode) -> Markup {
    layout(
        &format!("{} {} for {}", runtime.name, version.version, os.os),
        4,
        &[
            ("home", "../../../../".to_string()),
            (runtime.name.as_str(), "../../../".to_string()),
            (os.os.as_str(), "../../".to_string()),
        ],
        html! {
            h1 { (runtime.name) " " (version.version) " for " (os.os) }
            @for view in &version.releases {
                (release_section(view))
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::render::SiteAssets;
    use chrono::{DateTime, Utc};
    use rtpub_schema::{PlatformEntry, Release, Sha256Hash};
    use tempfile::TempDir;

    fn model() -> SiteModel {
        let binary = ArtifactFile {
            filename: "node-v22.15.0-linux-x64.tar.xz".into(),
            size: 2048,
            hash: Some(Sha256Hash::new("abc123")),
            url: "https://dl.example.com/node-v22.15.0-linux-x64.tar.xz".into(),
            uploaded_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let mut entry = PlatformEntry::empty("linux-x64".into(), "linux".into(), "x64".into());
        entry.binary = Some(binary);
        SiteModel {
            runtimes: vec![RuntimeNode {
                name: "nodejs".into(),
                platforms: vec![OsNode {
                    os: "linux".into(),
                    versions: vec![VersionNode {
                        major: 22,
                        minor: 15,
                        patch: 0,
                        version: "22.15.0".into(),
                        releases: vec![ReleaseView {
                            release: Release {
                                runtime: "nodejs".into(),
                                version: "22.15.0".into(),
                                major: 22,
                                minor: 15,
                                patch: 0,
                                tag: "nodejs-22.15.0".into(),
                                url: "https://example.com/r/nodejs-22.15.0".into(),
                                created_at: DateTime::<Utc>::UNIX_EPOCH,
                                artifacts: String::new(),
                            },
                            artifacts: vec![entry],
                            common_files: vec![],
                        }],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn test_renders_expected_tree() {
        let dir = TempDir::new().unwrap();
        let cancel = CancelToken::new();
        let ctx = RenderContext {
            root: dir.path(),
            assets: SiteAssets::get(),
            title: "Runtimes",
            cancel: &cancel,
        };
        let stats = render_pages(&model(), &ctx).unwrap();
        assert_eq!(stats.created, 5);

        let page =
            std::fs::read_to_string(dir.path().join("nodejs/linux/v22/22.15.0/index.html")).unwrap();
        assert!(page.contains("2.0 KiB"));
        assert!(page.contains("abc123"));
        assert!(page.contains("../../../../assets/style.css"));
        assert!(dir.path().join("assets/style.css").exists());
    }

    #[test]
    fn test_cancelled_before_runtime() {
        let dir = TempDir::new().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let ctx = RenderContext {
            root: dir.path(),
            assets: SiteAssets::get(),
            title: "Runtimes",
            cancel: &cancel,
        };
        let err = render_pages(&model(), &ctx).unwrap_err();
        assert!(matches!(err, RenderError::Cancelled));
        assert!(!dir.path().join("nodejs").exists());
    }

    #[test]
    fn test_empty_model_renders_root_only() {
        let dir = TempDir::new().unwrap();
        let cancel = CancelToken::new();
        let ctx = RenderContext {
            root: dir.path(),
            assets: SiteAssets::get(),
            title: "Runtimes",
            cancel: &cancel,
        };
        let stats = render_pages(&SiteModel::default(), &ctx).unwrap();
        assert_eq!(stats.created, 2);
        let root = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(root.contains("No runtimes"));
    }
}
