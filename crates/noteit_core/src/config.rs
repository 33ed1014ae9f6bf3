//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Locate the notes document and log directory.
//! - Pick the log level for the current build mode.
//!
//! # Invariants
//! - Blank environment values are treated as unset.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

/// Environment variable holding the data directory.
pub const DATA_DIR_ENV: &str = "NOTEIT_DATA_DIR";
/// Environment variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "NOTEIT_LOG_LEVEL";
/// File name of the persisted note document.
pub const NOTES_FILE_NAME: &str = "notes.json";

const DEFAULT_DATA_DIR_NAME: &str = "noteit";
const LOG_DIR_NAME: &str = "logs";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteitConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl NoteitConfig {
    /// Builds a config for an explicit data directory with the default level.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_log_level().to_string(),
        }
    }

    /// Reads `NOTEIT_DATA_DIR` and `NOTEIT_LOG_LEVEL`.
    ///
    /// Falls back to `<temp_dir>/noteit` and the build-mode default level.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = non_blank(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME));
        let log_level =
            non_blank(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string());

        Self {
            data_dir,
            log_level,
        }
    }

    /// Location of `notes.json`.
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(NOTES_FILE_NAME)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Data directory root.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
