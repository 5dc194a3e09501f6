use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;

/// Settings read from `config.toml`. Every field has a default, so an absent
/// file or a partial one is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(with = "humantime_str")]
    pub timeout: Duration,
    #[serde(with = "humantime_str")]
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("reqdeck/{}", env!("CARGO_PKG_VERSION")),
            data_dir: None,
            log_level: String::from("warn"),
        }
    }
}

impl Config {
    /// `<config_dir>/reqdeck/config.toml`
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("reqdeck").join("config.toml")
    }

    /// Load from `path`, or the default location. A missing file yields the
    /// defaults; a file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Where workspaces, collections and requests are stored.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            base.join("reqdeck")
        })
    }
}

/// Durations written as `"30s"`, `"1m 30s"`, `"500ms"`.
mod humantime_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout = \"5s\"\ndata_dir = \"/tmp/reqdeck-data\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/reqdeck-data"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout = \"soon\"\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(AppError::TomlDe(_))));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("timeout = \"30s\""));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
