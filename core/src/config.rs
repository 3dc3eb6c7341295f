use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pagination::PageSize;
use crate::{Error, StorageAction};

pub const CONFIG_ENV: &str = "DSPI_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "dspi.ron";
pub const DEFAULT_DATA_PATH: &str = "dspi-ledger.ron";
pub const DEFAULT_LOG_CAPACITY: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub default_page_size: PageSize,
    pub log_level: String,
    pub log_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_page_size: PageSize::default(),
            log_level: "info".to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl DashboardConfig {
    pub fn from_ron(contents: &str, path: Option<&Path>) -> Result<Self, Error> {
        ron::from_str(contents).map_err(|source| Error::RonParse {
            action: StorageAction::Load,
            path: path.map(|path| path.display().to_string()),
            source,
        })
    }

    /// Returns `Ok(None)` when there is no file at `path`.
    pub fn load(path: &Path) -> Result<Option<Self>, Error> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_ron(&contents, Some(path)).map(Some),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::StorageIo {
                action: StorageAction::Load,
                path: Some(path.display().to_string()),
                source,
            }),
        }
    }

    /// Config file location: the `DSPI_CONFIG` value when set and non-blank,
    /// otherwise `dspi.ron` in the working directory.
    pub fn resolve_path(env_value: Option<String>) -> PathBuf {
        env_value
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn config_path_from_env() -> PathBuf {
        Self::resolve_path(std::env::var(CONFIG_ENV).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = DashboardConfig::from_ron("(log_level: \"debug\")", None).expect("parse");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.default_page_size, PageSize::default());
        assert_eq!(config.log_capacity, DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn page_size_parses_both_forms() {
        let config = DashboardConfig::from_ron("(default_page_size: All)", None).expect("parse");
        assert_eq!(config.default_page_size, PageSize::All);

        let config =
            DashboardConfig::from_ron("(default_page_size: Entries(25))", None).expect("parse");
        assert_eq!(config.default_page_size, PageSize::entries(25).expect("size"));

        let error = DashboardConfig::from_ron("(default_page_size: Entries(0))", None)
            .expect_err("zero page size");
        assert!(matches!(error, Error::RonParse { .. }));
    }

    #[test]
    fn env_value_overrides_default_path() {
        assert_eq!(
            DashboardConfig::resolve_path(Some("/etc/dspi/config.ron".to_string())),
            PathBuf::from("/etc/dspi/config.ron")
        );
        assert_eq!(
            DashboardConfig::resolve_path(Some("  ".to_string())),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
        assert_eq!(
            DashboardConfig::resolve_path(None),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("dspi-config-that-does-not-exist.ron");
        assert!(DashboardConfig::load(&path).expect("load").is_none());
    }
}
