//! PEP 503 style "simple" index.
//!
//! Pages are plain link lists so lightweight resolvers can scrape them. Each
//! major version directory also carries an `index.json` listing
//! `<release-tag>/<binary-filename>` paths for discovery without HTML parsing.

use std::collections::{BTreeMap, BTreeSet};

use maud::{DOCTYPE, Markup, html};
use rtpub_schema::Sha256Hash;

use super::{Output, RenderContext, RenderError, check_cancel, segment};
use crate::site::{RuntimeNode, SiteModel};
use crate::writer::WriteStats;

/// Render `simple/` below the output root.
///
/// # Errors
///
/// Returns [`RenderError`] if a file cannot be written, the JSON index cannot
/// be serialized, a runtime name is not a valid directory name, or the cancel
/// token fires between runtimes.
pub fn render_simple_index(
    model: &SiteModel,
    ctx: &RenderContext<'_>,
) -> Result<WriteStats, RenderError> {
    let mut out = Output::new(ctx.root);

    let names: BTreeSet<&str> = model.runtimes.iter().map(|r| r.name.as_str()).collect();
    out.write(&["simple", "index.html"], root_page(&names).into_string().as_bytes())?;

    for runtime in &model.runtimes {
        check_cancel(ctx.cancel)?;
        let name = segment(&runtime.name)?;
        tracing::debug!("rendering simple index for {name}");

        let majors = runtime.majors();
        out.write(
            &["simple", name, "index.html"],
            runtime_page(name, &majors).into_string().as_bytes(),
        )?;

        for major in majors {
            let major_dir = format!("v{major}");
            let links = major_links(runtime, major);
            out.write(
                &["simple", name, &major_dir, "index.html"],
                major_page(name, major, &links).into_string().as_bytes(),
            )?;

            let paths = major_index(runtime, major);
            let json = serde_json::to_vec_pretty(&paths).map_err(|source| RenderError::Json {
                path: ctx.root.join("simple").join(name).join(&major_dir).join("index.json"),
                source,
            })?;
            out.write(&["simple", name, &major_dir, "index.json"], &json)?;
        }
    }

    Ok(out.finish())
}

/// One distribution link on a major-version page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DistLink {
    /// Link text.
    pub filename: String,
    /// Download URL, without fragment.
    pub url: String,
    /// Content hash, if known.
    pub hash: Option<Sha256Hash>,
}

impl DistLink {
    /// The `href` value, carrying `#sha256=` when a hash is known.
    pub fn href(&self) -> String {
        match &self.hash {
            Some(hash) => format!("{}{}", self.url, hash.integrity_fragment()),
            None => self.url.clone(),
        }
    }
}

/// Every distinct `(filename, url)` pair under `major`, sorted by filename.
///
/// If the same pair is seen with and without a hash, the hash wins.
pub fn major_links(runtime: &RuntimeNode, major: u64) -> Vec<DistLink> {
    let mut seen: BTreeMap<(String, String), Option<Sha256Hash>> = BTreeMap::new();

    let files = runtime
        .platforms
        .iter()
        .flat_map(|os| &os.versions)
        .filter(|v| v.major == major)
        .flat_map(|v| &v.releases)
        .flat_map(|r| &r.artifacts)
        .flat_map(rtpub_schema::PlatformEntry::files);

    for file in files {
        let slot = seen
            .entry((file.filename.clone(), file.url.clone()))
            .or_default();
        if slot.is_none() {
            slot.clone_from(&file.hash);
        }
    }

    seen.into_iter()
        .map(|((filename, url), hash)| DistLink {
            filename,
            url,
            hash,
        })
        .collect()
}

/// Sorted, de-duplicated `<release-tag>/<binary-filename>` paths under `major`.
pub fn major_index(runtime: &RuntimeNode, major: u64) -> Vec<String> {
    let paths: BTreeSet<String> = runtime
        .platforms
        .iter()
        .flat_map(|os| &os.versions)
        .filter(|v| v.major == major)
        .flat_map(|v| &v.releases)
        .flat_map(|r| {
            r.artifacts
                .iter()
                .filter_map(|p| p.binary.as_ref())
                .map(|b| format!("{}/{}", r.release.tag, b.filename))
        })
        .collect();
    paths.into_iter().collect()
}

fn simple_layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta name="pypi:repository-version" content="1.0";
                title { (title) }
            }
            body {
                h1 { (title) }
                (body)
            }
        }
    }
}

fn root_page(names: &BTreeSet<&str>) -> Markup {
    simple_layout(
        "Simple index",
        html! {
            @for name in names {
                a href=(format!("{name}/")) { (name) }
                br;
            }
        },
    )
}

fn runtime_page(name: &str, majors: &[u64]) -> Markup {
    let mut ascending = majors.to_vec();
    ascending.sort_unstable();
    simple_layout(
        &format!("Links for {name}"),
        html! {
            @for major in &ascending {
                a href=(format!("v{major}/")) { "v" (major) }
                br;
            }
        },
    )
}

fn major_page(name: &str, major: u64, links: &[DistLink]) -> Markup {
    simple_layout(
        &format!("Links for {name} v{major}"),
        html! {
            @for link in links {
                a href=(link.href()) { (link.filename) }
                br;
            }
        },
    )
}
