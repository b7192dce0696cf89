use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

use chrono::{TimeZone, Utc};
use rtpub_core::artifacts::{UploadedFile, Verification, build_artifacts_document};
use rtpub_core::{CancelToken, GenerateOptions, ReleaseDb, generate_site};
use rtpub_schema::{Release, Sha256Hash};
use tempfile::TempDir;

fn release(runtime: &str, version: &str, tag: &str, files: &[(&str, Option<&str>)]) -> Release {
    let uploads: BTreeMap<String, UploadedFile> = files
        .iter()
        .map(|(name, hash)| {
            (
                (*name).to_string(),
                UploadedFile {
                    url: format!("https://dl.example.com/{tag}/{name}"),
                    hash: hash.map(Sha256Hash::from),
                    size: 4096,
                },
            )
        })
        .collect();
    let created_at = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
    let doc = build_artifacts_document(&uploads, &[], Verification::default(), created_at);
    let first = rtpub_schema::SemverParts::parse(
        version.split(',').next().unwrap_or_default(),
    )
    .into_value();

    Release {
        runtime: runtime.into(),
        version: version.into(),
        major: first.major,
        minor: first.minor,
        patch: first.patch,
        tag: tag.into(),
        url: format!("https://example.com/releases/{tag}"),
        created_at,
        artifacts: doc.to_json().unwrap(),
    }
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("{rel}: {e}"))
}

fn mtimes(root: &Path) -> BTreeMap<String, SystemTime> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().display().to_string();
            (rel, e.metadata().unwrap().modified().unwrap())
        })
        .collect()
}

#[test]
fn test_end_to_end_single_release() {
    let out = TempDir::new().unwrap();
    let rows = vec![release(
        "nodejs",
        "22.15.0",
        "nodejs-22.15.0",
        &[("node-v22.15.0-linux-x64.tar.xz", Some("abc123"))],
    )];

    let report = generate_site(
        &rows,
        out.path(),
        &GenerateOptions::default(),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(report.runtimes, 1);

    let page = read(out.path(), "nodejs/linux/v22/22.15.0/index.html");
    assert!(page.contains("node-v22.15.0-linux-x64.tar.xz"));
    assert!(page.contains("4.0 KiB"));

    let simple = read(out.path(), "simple/nodejs/v22/index.html");
    assert!(simple.contains(
        "https://dl.example.com/nodejs-22.15.0/node-v22.15.0-linux-x64.tar.xz#sha256=abc123"
    ));

    let json: Vec<String> =
        serde_json::from_str(&read(out.path(), "simple/nodejs/v22/index.json")).unwrap();
    assert_eq!(json, vec!["nodejs-22.15.0/node-v22.15.0-linux-x64.tar.xz"]);

    let root = read(out.path(), "simple/index.html");
    assert!(root.contains(r#"href="nodejs/""#));
}

#[test]
fn test_regeneration_is_idempotent() {
    let out = TempDir::new().unwrap();
    let rows = vec![
        release(
            "nodejs",
            "22.15.0",
            "nodejs-22.15.0",
            &[
                ("node-v22.15.0-linux-x64.tar.xz", Some("abc123")),
                ("node-v22.15.0-darwin-arm64.tar.gz", None),
                ("SHASUMS256.txt", None),
            ],
        ),
        release(
            "python",
            "3.13.1",
            "python-3.13.1",
            &[("python-v3.13.1-windows-x64.zip", Some("def456"))],
        ),
    ];
    let options = GenerateOptions::default();

    let first = generate_site(&rows, out.path(), &options, &CancelToken::new()).unwrap();
    assert!(first.total().created > 0);
    let before = mtimes(out.path());

    let second = generate_site(&rows, out.path(), &options, &CancelToken::new()).unwrap();
    assert_eq!(second.total().written(), 0);
    assert_eq!(second.total().unchanged, first.total().created);
    assert_eq!(mtimes(out.path()), before);
}

#[test]
fn test_aggregated_release_splits_per_version() {
    let out = TempDir::new().unwrap();
    let rows = vec![release(
        "nodejs",
        "22.15.0, 22.14.0",
        "nodejs-22",
        &[
            ("node-v22.15.0-linux-x64.tar.xz", Some("aaa")),
            ("node-v22.14.0-linux-x64.tar.xz", Some("bbb")),
        ],
    )];

    let report = generate_site(
        &rows,
        out.path(),
        &GenerateOptions::default(),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(report.releases, 1);
    assert_eq!(report.views, 2);

    let newer = read(out.path(), "nodejs/linux/v22/22.15.0/index.html");
    assert!(newer.contains("node-v22.15.0-linux-x64.tar.xz"));
    assert!(!newer.contains("node-v22.14.0-linux-x64.tar.xz"));

    let older = read(out.path(), "nodejs/linux/v22/22.14.0/index.html");
    assert!(older.contains("node-v22.14.0-linux-x64.tar.xz"));
    assert!(!older.contains("node-v22.15.0-linux-x64.tar.xz"));
}

#[test]
fn test_darwin_renders_as_mac() {
    let out = TempDir::new().unwrap();
    let rows = vec![release(
        "nodejs",
        "22.15.0",
        "nodejs-22.15.0",
        &[("node-v22.15.0-darwin-arm64.tar.gz", None)],
    )];
    generate_site(
        &rows,
        out.path(),
        &GenerateOptions::default(),
        &CancelToken::new(),
    )
    .unwrap();
    assert!(out.path().join("nodejs/mac/v22/22.15.0/index.html").exists());
    assert!(!out.path().join("nodejs/darwin").exists());

    let simple = read(out.path(), "simple/nodejs/v22/index.html");
    assert!(!simple.contains("#sha256="));
}

#[test]
fn test_malformed_document_aborts_load() {
    let out = TempDir::new().unwrap();
    let mut bad = release("nodejs", "22.15.0", "bad", &[]);
    bad.artifacts = "{not json".into();
    let err = generate_site(
        &vec![bad],
        out.path(),
        &GenerateOptions::default(),
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, rtpub_core::PipelineError::Load(_)));
    assert!(!out.path().join("index.html").exists());
}

#[test]
fn test_generate_from_database() {
    let dir = TempDir::new().unwrap();
    let db = ReleaseDb::open(&dir.path().join("releases.db")).unwrap();
    db.insert_release(&release(
        "nodejs",
        "20.0.0",
        "nodejs-20.0.0",
        &[("node-v20.0.0-linux-x64.tar.xz", None)],
    ))
    .unwrap();

    let out = dir.path().join("site");
    let report =
        generate_site(&db, &out, &GenerateOptions::default(), &CancelToken::new()).unwrap();
    assert_eq!(report.releases, 1);
    assert!(out.join("nodejs/linux/v20/20.0.0/index.html").exists());
}
