//! Configuration management for the yaadein application.
//!
//! This module handles loading and validating configuration settings from
//! environment variables, with sensible defaults. All durable state (the
//! entry database, the preferences file, exported PDFs) lives under a single
//! data directory.
//!
//! # Environment Variables
//!
//! - `YAADEIN_DIR`: Path to the data directory (defaults to ~/.yaadein)
//! - `HOME`: Used for expanding the default data directory path

use crate::constants::{
    DATABASE_FILE_NAME, DEFAULT_DATA_SUBDIR, ENV_VAR_HOME, ENV_VAR_YAADEIN_DIR, EXPORTS_SUBDIR,
    PREFERENCES_FILE_NAME,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Configuration for the yaadein application.
///
/// Holds the data directory under which the database, preferences file and
/// export directory are placed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where all application data is stored.
    pub data_dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// Reads `YAADEIN_DIR`, falling back to `~/.yaadein`, and expands the
    /// path using `shellexpand` to handle `~` and environment variable
    /// references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if path expansion fails or the resulting
    /// path is empty.
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_YAADEIN_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_else(|_| "".to_string());
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;

        let data_dir = PathBuf::from(expanded_path.into_owned());

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        Ok(Config { data_dir })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the data directory path is empty or
    /// relative.
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Path of the JSON preferences file.
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE_NAME)
    }

    /// Directory that exported PDFs are written into.
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORTS_SUBDIR)
    }

    /// Creates the data directory and exports sub-directory if absent.
    ///
    /// Idempotent; safe to call on every startup.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_directories(&self) -> AppResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.exports_dir())?;
        Ok(())
    }
}
