//! `rtpub.toml` configuration.
//!
//! Values are layered: built-in defaults rooted at the rtpub home directory,
//! then the config file, then `RTPUB_*` environment variables. Command-line
//! flags are applied last by the binary.
//!
//! ```toml
//! database = "/srv/rtpub/releases.db"
//! output_dir = "/srv/www/runtimes"
//! site_title = "Runtime downloads"
//!
//! [host]
//! root = "/srv/www/files"
//! base_url = "https://files.example.com"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::paths;

/// Default title of the human-readable root page.
pub const DEFAULT_SITE_TITLE: &str = "Runtime releases";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine home directory. Set RTPUB_HOME to override.")]
    NoHome,
}

/// Local release host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Directory uploaded assets are copied into.
    pub root: PathBuf,
    /// Public URL prefix `root` is served under.
    pub base_url: String,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite release store.
    pub database: PathBuf,
    /// Root of the generated site.
    pub output_dir: PathBuf,
    /// Title of the human-readable root page.
    pub site_title: String,
    /// Release host.
    pub host: HostConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    site_title: Option<String>,
    #[serde(default)]
    host: HostFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HostFile {
    root: Option<PathBuf>,
    base_url: Option<String>,
}

impl Config {
    /// Defaults rooted at `home`.
    pub fn defaults(home: &Path) -> Self {
        let mirror = paths::mirror_path(home);
        let base_url = format!("file://{}", mirror.display());
        Self {
            database: paths::db_path(home),
            output_dir: paths::site_path(home),
            site_title: DEFAULT_SITE_TITLE.to_string(),
            host: HostConfig {
                root: mirror,
                base_url,
            },
        }
    }

    /// Load configuration using the process environment.
    ///
    /// `explicit` names a config file; otherwise `<home>/rtpub.toml` is used
    /// if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load configuration with a custom environment lookup.
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let home = paths::try_rtpub_home(&env).ok_or(ConfigError::NoHome)?;
        let mut config = Self::defaults(&home);

        let path = explicit.map_or_else(|| paths::config_path(&home), Path::to_path_buf);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: ConfigFile = toml::from_str(&content)
                    .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
                tracing::debug!("loaded config from {}", path.display());
                config.apply_file(file);
            }
            // Only an explicitly named file has to exist.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {}
            Err(source) => return Err(ConfigError::Io { path, source }),
        }

        config.apply_env(&env);
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.database {
            self.database = v;
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file.site_title {
            self.site_title = v;
        }
        if let Some(v) = file.host.root {
            self.host.root = v;
        }
        if let Some(v) = file.host.base_url {
            self.host.base_url = v;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());
        if let Some(v) = var("RTPUB_DATABASE") {
            self.database = v.into();
        }
        if let Some(v) = var("RTPUB_OUTPUT_DIR") {
            self.output_dir = v.into();
        }
        if let Some(v) = var("RTPUB_HOST_ROOT") {
            self.host.root = v.into();
        }
        if let Some(v) = var("RTPUB_BASE_URL") {
            self.host.base_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let home = dir.path().to_str().unwrap();
        let config = Config::load_with(None, env(&[("RTPUB_HOME", home)])).unwrap();
        assert_eq!(config, Config::defaults(dir.path()));
        assert_eq!(config.database, dir.path().join("releases.db"));
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("rtpub.toml"),
            r#"
            output_dir = "/from/file"
            site_title = "Mirror"

            [host]
            base_url = "https://files.example.com"
            "#,
        )
        .unwrap();

        let home = dir.path().to_str().unwrap();
        let config = Config::load_with(
            None,
            env(&[("RTPUB_HOME", home), ("RTPUB_OUTPUT_DIR", "/from/env")]),
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/from/env"));
        assert_eq!(config.site_title, "Mirror");
        assert_eq!(config.host.base_url, "https://files.example.com");
        assert_eq!(config.host.root, dir.path().join("mirror"));
    }

    #[test]
    fn test_unparsable_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "database = [").unwrap();
        let home = dir.path().to_str().unwrap();
        let err = Config::load_with(Some(&path), env(&[("RTPUB_HOME", home)])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let home = dir.path().to_str().unwrap();
        let err = Config::load_with(
            Some(&dir.path().join("nope.toml")),
            env(&[("RTPUB_HOME", home)]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
