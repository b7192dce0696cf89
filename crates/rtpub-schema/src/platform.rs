//! Platform naming shared by the publisher and the site generator.
//!
//! Vendors use inconsistent OS naming (`darwin`, `macos`, `mac`). Artifact
//! documents keep whatever name the file or download record carried; the
//! site model normalizes `darwin` to `mac` and nothing else.

/// Operating system names recognized as filename tokens by the classifier.
pub const KNOWN_OS: &[&str] = &[
    "linux", "darwin", "mac", "macos", "windows", "win", "freebsd", "openbsd", "netbsd", "aix",
    "sunos", "android",
];

/// OS columns that always sort first, in this order.
pub const PRIMARY_OS_ORDER: &[&str] = &["linux", "mac", "windows"];

/// Map an OS name onto its site-model column name.
///
/// ```
/// use rtpub_schema::normalize_os;
///
/// assert_eq!(normalize_os("darwin"), "mac");
/// assert_eq!(normalize_os("linux"), "linux");
/// ```
pub fn normalize_os(os: &str) -> &str {
    if os == "darwin" { "mac" } else { os }
}

/// Position of an OS column in the fixed prefix, or `None` for other names.
pub fn os_rank(os: &str) -> Option<usize> {
    PRIMARY_OS_ORDER.iter().position(|o| *o == os)
}

/// Order a set of OS column names: the fixed prefix first, then a separately
/// sorted remainder.
pub fn order_os_columns<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut fixed = Vec::new();
    let mut rest = Vec::new();
    for name in names {
        if os_rank(name).is_some() {
            fixed.push(name);
        } else {
            rest.push(name);
        }
    }
    fixed.sort_by_key(|n| os_rank(n));
    fixed.dedup();
    rest.sort_unstable();
    rest.dedup();
    fixed.extend(rest);
    fixed
}

/// The `os-arch` label exposed in artifact documents.
pub fn platform_label(os: &str, arch: &str) -> String {
    format!("{os}-{arch}")
}
