use serde::{Deserialize, Serialize};

/// An authoritative description of a downloaded, verified runtime binary.
///
/// Produced by the download/verification step before publishing; when an
/// uploaded filename matches [`DownloadRecord::file_name`] the classifier
/// trusts these coordinates instead of guessing from the filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Operating system (e.g. `linux`, `darwin`).
    pub os: String,
    /// CPU architecture (e.g. `x64`, `arm64`).
    pub arch: String,
    /// Semantic version of the runtime this file belongs to.
    pub version: String,
    /// Size in bytes.
    pub size: u64,
    /// Local path the file was downloaded to.
    pub path: String,
}

impl DownloadRecord {
    /// Base name of [`DownloadRecord::path`].
    ///
    /// ```
    /// use rtpub_schema::DownloadRecord;
    ///
    /// let r = DownloadRecord {
    ///     os: "linux".into(),
    ///     arch: "x64".into(),
    ///     version: "22.15.0".into(),
    ///     size: 1,
    ///     path: "/tmp/dl/node-v22.15.0-linux-x64.tar.xz".into(),
    /// };
    /// assert_eq!(r.file_name(), "node-v22.15.0-linux-x64.tar.xz");
    /// ```
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }
}
