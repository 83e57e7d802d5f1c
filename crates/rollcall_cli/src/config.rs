//! Runtime paths and log level for the CLI.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "rollcall.db";
const LOG_DIR_NAME: &str = "logs";

/// Resolved filesystem layout under the data directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Makes `data_dir` absolute and creates it.
    pub fn resolve(data_dir: &Path, log_level: Option<String>) -> Result<Self> {
        let data_dir = if data_dir.is_absolute() {
            data_dir.to_path_buf()
        } else {
            std::env::current_dir()
                .context("failed to read current directory")?
                .join(data_dir)
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        Ok(Self {
            data_dir,
            log_level: log_level.unwrap_or_else(|| rollcall_core::default_log_level().to_string()),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn resolve_creates_data_dir_and_derives_paths() {
        let root = tempfile::tempdir().unwrap();
        let data_dir = root.path().join("nested").join("data");

        let config = AppConfig::resolve(&data_dir, Some("warn".to_string())).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(config.db_path(), data_dir.join("rollcall.db"));
        assert_eq!(config.log_dir(), data_dir.join("logs"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn resolve_falls_back_to_build_default_level() {
        let root = tempfile::tempdir().unwrap();
        let config = AppConfig::resolve(root.path(), None).unwrap();
        assert_eq!(config.log_level, rollcall_core::default_log_level());
    }
}
