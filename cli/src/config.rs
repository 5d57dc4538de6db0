//! Configuration for the Tally CLI.

use std::env;
use std::path::PathBuf;

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted storage records
    pub data_dir: PathBuf,
    /// Log filter directive (TALLY_LOG)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `TALLY_DATA_DIR` overrides the platform data directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match env::var_os("TALLY_DATA_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("tally"),
        };

        let log_filter =
            env::var("TALLY_LOG").unwrap_or_else(|_| "tally=warn,tally_engine=warn".to_string());

        Ok(Self {
            data_dir,
            log_filter,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no platform data directory available; set TALLY_DATA_DIR")]
    NoDataDir,
}
