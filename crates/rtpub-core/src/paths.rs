use dirs::home_dir;
use std::path::PathBuf;

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "RTPUB_HOME";

/// Returns the rtpub home directory, or None if the user's home cannot be resolved.
///
/// `env` looks up environment variables, so callers and tests can supply
/// their own view of the environment.
pub fn try_rtpub_home(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(val) = env(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".rtpub"))
}

/// `SQLite` release store below `home`: `releases.db`
pub fn db_path(home: &std::path::Path) -> PathBuf {
    home.join("releases.db")
}

/// Generated site below `home`: `site`
pub fn site_path(home: &std::path::Path) -> PathBuf {
    home.join("site")
}

/// Local release host root below `home`: `mirror`
pub fn mirror_path(home: &std::path::Path) -> PathBuf {
    home.join("mirror")
}

/// Config file below `home`: `rtpub.toml`
pub fn config_path(home: &std::path::Path) -> PathBuf {
    home.join("rtpub.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_override() {
        let home = try_rtpub_home(|k| (k == HOME_ENV).then(|| "/srv/rtpub".to_string())).unwrap();
        assert_eq!(home, PathBuf::from("/srv/rtpub"));
        assert_eq!(db_path(&home), PathBuf::from("/srv/rtpub/releases.db"));
        assert_eq!(mirror_path(&home), PathBuf::from("/srv/rtpub/mirror"));
    }

    #[test]
    fn test_empty_override_ignored() {
        let home = try_rtpub_home(|_| Some(String::new()));
        assert_ne!(home, Some(PathBuf::new()));
    }
}
