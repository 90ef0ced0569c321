//! Configuration management and validation.
//!
//! Provides the run configuration: input roots, storage descriptor and
//! the policy applied when a file violates a table constraint.

use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_LOG_DATA, DEFAULT_SONG_DATA};
use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the batch driver does when a file violates a constraint
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Stop the run and report the offending file
    #[default]
    Abort,
    /// Roll the file back, record it as failed and continue
    Skip,
}

/// Global configuration for a load run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Root of the song metadata files
    pub song_data_path: PathBuf,

    /// Root of the event log files
    pub log_data_path: PathBuf,

    /// sqlite: URL of the target database
    pub database_url: String,

    /// Policy for constraint violations (e.g. a log file loaded twice)
    pub conflict_policy: ConflictPolicy,

    /// Draw progress bars while loading
    pub show_progress: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            song_data_path: PathBuf::from(DEFAULT_SONG_DATA),
            log_data_path: PathBuf::from(DEFAULT_LOG_DATA),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            conflict_policy: ConflictPolicy::Abort,
            show_progress: true,
        }
    }
}

impl EtlConfig {
    pub fn with_song_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.song_data_path = path.into();
        self
    }

    pub fn with_log_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_data_path = path.into();
        self
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Check the configuration before connecting or reading any input
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(EtlError::configuration(format!(
                "Database URL must be a sqlite: URL, got '{}'",
                self.database_url
            )));
        }

        for (label, path) in [
            ("Song data", &self.song_data_path),
            ("Log data", &self.log_data_path),
        ] {
            if !path.exists() {
                return Err(EtlError::configuration(format!(
                    "{} path does not exist: {}",
                    label,
                    path.display()
                )));
            }
            if !path.is_dir() {
                return Err(EtlError::configuration(format!(
                    "{} path is not a directory: {}",
                    label,
                    path.display()
                )));
            }
        }

        Ok(())
    }
}
