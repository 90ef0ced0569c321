//! Batch driver.
//!
//! Discovers the input files under a root and loads them one at a time,
//! each inside its own transaction. A run loads every song file before
//! any log file, so that play events can be linked to songs and artists
//! from the whole catalogue.

pub mod discovery;
pub mod log_file;
pub mod song_file;

#[cfg(test)]
mod tests;

use self::discovery::FileDiscovery;
use self::log_file::process_log_file;
use self::song_file::process_song_file;

use crate::config::{ConflictPolicy, EtlConfig};
use crate::error::{EtlError, Result};
use crate::models::{BatchStats, DataKind, FailedFile, FileOutcome, RunStats};

use indicatif::{ProgressBar, ProgressStyle};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Loads every file under one input root
#[derive(Debug)]
pub struct BatchProcessor<'a> {
    pool: &'a SqlitePool,
    config: &'a EtlConfig,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(pool: &'a SqlitePool, config: &'a EtlConfig) -> Self {
        Self { pool, config }
    }

    /// Load all `.json` files under `root` as `kind` input, in sorted path order.
    ///
    /// Files that cannot be read, decoded or mapped are rolled back and
    /// recorded as failed. Constraint violations follow the configured
    /// [`ConflictPolicy`]. Storage failures stop the batch with
    /// [`EtlError::FileAborted`]; files committed before it stay committed.
    pub async fn process_batch(&self, root: &Path, kind: DataKind) -> Result<BatchStats> {
        let discovery = FileDiscovery::new(root);
        let files = discovery.discover()?;
        let total = files.len();
        info!("{} files found in {}", total, discovery.root().display());

        let mut stats = BatchStats::new(kind, root.to_path_buf());
        stats.files_found = total;

        let pb = self.progress_bar(total as u64, kind);

        for (index, file_path) in files.iter().enumerate() {
            match self.process_file(file_path, kind).await {
                Ok(outcome) => stats.record(&outcome),
                Err(e) if e.is_file_level() => {
                    warn!("Skipping {}: {}", file_path.display(), e);
                    stats.failed_files.push(failed(file_path, &e));
                }
                Err(e)
                    if e.is_constraint_violation()
                        && self.config.conflict_policy == ConflictPolicy::Skip =>
                {
                    warn!("Rolled back {}: {}", file_path.display(), e);
                    stats.failed_files.push(failed(file_path, &e));
                }
                Err(e) => {
                    pb.abandon();
                    error!("Failed to load {}: {}", file_path.display(), e);
                    return Err(EtlError::FileAborted {
                        path: file_path.clone(),
                        source: Box::new(e),
                    });
                }
            }

            pb.inc(1);
            info!("{}/{} files processed.", index + 1, total);
        }

        pb.finish_and_clear();
        Ok(stats)
    }

    /// Load one file inside its own transaction.
    ///
    /// The transaction commits only if every row of the file was written;
    /// otherwise it is rolled back and nothing from the file persists.
    pub async fn process_file(&self, file_path: &Path, kind: DataKind) -> Result<FileOutcome> {
        let mut tx = self.pool.begin().await.map_err(EtlError::Connection)?;

        let result = match kind {
            DataKind::Song => process_song_file(&mut tx, file_path).await,
            DataKind::Log => process_log_file(&mut tx, file_path).await,
        };

        match result {
            Ok(outcome) => {
                tx.commit().await?;
                debug!("Committed {}", file_path.display());
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(
                        "Rollback of {} failed: {}",
                        file_path.display(),
                        rollback_error
                    );
                }
                Err(e)
            }
        }
    }

    fn progress_bar(&self, total: u64, kind: DataKind) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("{} files", kind));
        pb
    }
}

fn failed(path: &Path, error: &EtlError) -> FailedFile {
    FailedFile {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Full load: the song root, then the log root
#[derive(Debug)]
pub struct Pipeline<'a> {
    pool: &'a SqlitePool,
    config: &'a EtlConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(pool: &'a SqlitePool, config: &'a EtlConfig) -> Self {
        Self { pool, config }
    }

    /// Run both phases. The log phase does not start unless the song
    /// phase completed.
    pub async fn run(&self) -> Result<RunStats> {
        let start_time = Instant::now();
        let batch = BatchProcessor::new(self.pool, self.config);

        let songs = batch
            .process_batch(&self.config.song_data_path, DataKind::Song)
            .await?;
        info!(
            "Song phase complete: {} songs, {} artists from {} files",
            songs.rows.songs, songs.rows.artists, songs.files_processed
        );

        let logs = batch
            .process_batch(&self.config.log_data_path, DataKind::Log)
            .await?;
        info!(
            "Log phase complete: {} songplays from {} files",
            logs.rows.songplays, logs.files_processed
        );

        Ok(RunStats {
            songs,
            logs,
            processing_time_ms: start_time.elapsed().as_millis(),
        })
    }
}
