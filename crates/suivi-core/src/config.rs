//! Dashboard configuration
//!
//! Loaded from an optional TOML file, then overridden by `SUIVI_*`
//! environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `SUIVI_API_URL` | `api.base_url` |
//! | `SUIVI_API_TIMEOUT_SECS` | `api.timeout_secs` |
//! | `SUIVI_REFRESH_SECS` | `refresh_interval_secs` |
//! | `SUIVI_UPCOMING_DAYS` | `upcoming_days` |
//! | `SUIVI_LEADERBOARD_SIZE` | `leaderboard_size` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use suivi_api::ApiConfig;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Parse error
        #[source]
        source: toml::de::Error,
    },

    /// Environment override could not be parsed
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// API connection
    pub api: ApiConfig,
    /// Period of the automatic refresh
    pub refresh_interval_secs: u64,
    /// Horizon of the "due soon" alerts
    pub upcoming_days: u32,
    /// Lines shown on the admin leaderboard
    pub leaderboard_size: usize,
}

impl DashboardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API settings
    #[inline]
    #[must_use]
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// With refresh period
    #[inline]
    #[must_use]
    pub fn with_refresh_interval_secs(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    /// With "due soon" horizon
    #[inline]
    #[must_use]
    pub fn with_upcoming_days(mut self, days: u32) -> Self {
        self.upcoming_days = days;
        self
    }

    /// With leaderboard length
    #[inline]
    #[must_use]
    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    /// Refresh period as a duration, never shorter than one second
    #[inline]
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Read `path` if given, then apply the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply `SUIVI_*` overrides from `vars`
    pub fn apply_env(
        mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        for (key, value) in vars {
            match key.as_str() {
                "SUIVI_API_URL" => self.api.base_url = value,
                "SUIVI_API_TIMEOUT_SECS" => self.api.timeout_secs = parse_var(&key, &value)?,
                "SUIVI_REFRESH_SECS" => self.refresh_interval_secs = parse_var(&key, &value)?,
                "SUIVI_UPCOMING_DAYS" => self.upcoming_days = parse_var(&key, &value)?,
                "SUIVI_LEADERBOARD_SIZE" => self.leaderboard_size = parse_var(&key, &value)?,
                _ => continue,
            }
            tracing::debug!(key = %key, "configuration overridden from environment");
        }
        Ok(self)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            refresh_interval_secs: 300,
            upcoming_days: 7,
            leaderboard_size: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.upcoming_days, 7);
        assert_eq!(config.leaderboard_size, 5);
    }

    #[test]
    fn file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "refresh_interval_secs = 60\n\n[api]\nbase_url = \"https://suivi.example.org/api\"\n"
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path())
            .unwrap()
            .apply_env(vars(&[("SUIVI_UPCOMING_DAYS", "14"), ("HOME", "/root")]))
            .unwrap();

        assert_eq!(config.api.base_url, "https://suivi.example.org/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.upcoming_days, 14);
    }

    #[test]
    fn env_overrides_url() {
        let config = DashboardConfig::new()
            .apply_env(vars(&[("SUIVI_API_URL", "http://10.0.0.5/api")]))
            .unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let err = DashboardConfig::new()
            .apply_env(vars(&[("SUIVI_REFRESH_SECS", "often")]))
            .unwrap_err();
        assert!(err.to_string().contains("SUIVI_REFRESH_SECS"));
    }

    #[test]
    fn bad_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = \"soon\"").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        let config = DashboardConfig::new().with_refresh_interval_secs(0);
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
