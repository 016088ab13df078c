//! CLI configuration file

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up when `--config` is not given; absence means defaults
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/rewardstream/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Snapshot JSON written by the vault poller
    pub snapshot_path: PathBuf,
    /// Recompute interval for `watch`
    pub tick_interval_secs: u64,
    /// Snapshot reload interval for `watch`
    pub poll_interval_secs: u64,
    /// Optional reward token price file
    pub price_path: Option<PathBuf>,
    /// Prices older than this are not shown
    pub price_max_age_secs: u64,
    /// Decimals printed for amounts
    pub display_decimals: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("snapshot.json"),
            tick_interval_secs: 1,
            poll_interval_secs: 15,
            price_path: None,
            price_max_age_secs: 300,
            display_decimals: 4,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location if it exists
    ///
    /// An explicitly given path must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (expand(Path::new(DEFAULT_CONFIG_PATH)), false),
        };

        if !explicit && !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: AppConfig =
            toml::from_str(&data).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;

        config.snapshot_path = expand(&config.snapshot_path);
        config.price_path = config.price_path.as_deref().map(expand);
        config.validate()?;

        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid("tick_interval_secs must be positive"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be positive"));
        }
        if self.display_decimals > reward_model::fixed::DECIMALS {
            return Err(ConfigError::Invalid("display_decimals must be at most 18"));
        }
        Ok(())
    }
}

/// Expand `~` and environment variables in a path
fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_fields_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_secs = 2").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.tick_interval_secs, 2);
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(config.snapshot_path, PathBuf::from("snapshot.json"));
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(AppConfig::load(Some(&missing)), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = 0").unwrap();
        assert!(matches!(AppConfig::load(Some(file.path())), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rpc_url = \"http://127.0.0.1:8899\"").unwrap();
        assert!(matches!(AppConfig::load(Some(file.path())), Err(ConfigError::Parse { .. })));
    }
}
