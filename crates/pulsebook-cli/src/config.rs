//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database file, instead of the platform default
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Lookback for `show` when `--days` is not given
    #[serde(default)]
    pub default_days: Option<u32>,

    /// Default output format ("text" or "json")
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulsebook")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from a specific file. Unreadable or invalid files fall
    /// back to the defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Failed to parse config {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read config {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the database path from `--db`/`PULSEBOOK_DB`, config, or the
/// platform default.
pub fn resolve_db_path(arg: Option<PathBuf>, config: &Config) -> PathBuf {
    arg.or_else(|| config.database.clone())
        .unwrap_or_else(pulsebook_store::default_db_path)
}

/// Resolve the `show` lookback. `all` wins over everything.
pub fn resolve_days(arg: Option<u32>, all: bool, config: &Config) -> Option<u32> {
    if all {
        None
    } else {
        arg.or(config.default_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_prefers_arg() {
        let config = Config {
            database: Some(PathBuf::from("/config/health.db")),
            ..Default::default()
        };
        let result = resolve_db_path(Some(PathBuf::from("/arg/health.db")), &config);
        assert_eq!(result, PathBuf::from("/arg/health.db"));
    }

    #[test]
    fn test_resolve_db_path_falls_back_to_config() {
        let config = Config {
            database: Some(PathBuf::from("/config/health.db")),
            ..Default::default()
        };
        assert_eq!(resolve_db_path(None, &config), PathBuf::from("/config/health.db"));
    }

    #[test]
    fn test_resolve_db_path_default() {
        let path = resolve_db_path(None, &Config::default());
        assert!(path.ends_with("pulsebook/health.db"));
    }

    #[test]
    fn test_resolve_days() {
        let config = Config {
            default_days: Some(30),
            ..Default::default()
        };
        assert_eq!(resolve_days(Some(7), false, &config), Some(7));
        assert_eq!(resolve_days(None, false, &config), Some(30));
        assert_eq!(resolve_days(None, true, &config), None);
        assert_eq!(resolve_days(None, false, &Config::default()), None);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulsebook").join("config.toml");
        let config = Config {
            database: Some(PathBuf::from("/data/health.db")),
            default_days: Some(14),
            format: Some("json".to_string()),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("none.toml")), Config::default());
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_days = \"seven\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(config.format.as_deref(), Some("json"));
        assert!(config.database.is_none());
    }
}
