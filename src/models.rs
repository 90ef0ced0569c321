//! Core data structures for the load pipeline.
//!
//! Defines the decoded record type, the typed source records, one row type
//! per target table, and the statistics reported by the batch driver.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{EtlError, Result};

/// One decoded line of an input file: field name to JSON value
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Song metadata as it appears in a song file
#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: f64,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

/// A song play event as it appears in an event log
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub ts: i64,
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

/// Time dimension row derived from an event timestamp
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    pub day: i32,
    /// ISO-8601 week number
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: i32,
}

impl TimeRow {
    /// Derive the time row for an epoch timestamp in milliseconds (UTC)
    pub fn from_epoch_millis(ts: i64) -> Result<Self> {
        let start_time = epoch_millis_to_datetime(ts)?;

        Ok(Self {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_monday() as i32,
        })
    }
}

/// Convert an epoch timestamp in milliseconds to a naive UTC timestamp
pub fn epoch_millis_to_datetime(ts: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| EtlError::mapping("ts", format!("timestamp {ts} is out of range")))
}

/// Songplay fact row. The surrogate `songplay_id` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SongplayRow {
    pub start_time: NaiveDateTime,
    pub user_id: String,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Song identity keys looked up for a play event
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

/// Which kind of input a batch holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    /// Song metadata files; feed the song and artist dimensions
    Song,
    /// Event log files; feed the time and user dimensions and the fact table
    Log,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Song => write!(f, "song"),
            DataKind::Log => write!(f, "log"),
        }
    }
}

/// Rows written per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub songs: u64,
    pub artists: u64,
    pub users: u64,
    pub time: u64,
    pub songplays: u64,
}

impl RowCounts {
    pub fn add(&mut self, other: &RowCounts) {
        self.songs += other.songs;
        self.artists += other.artists;
        self.users += other.users;
        self.time += other.time;
        self.songplays += other.songplays;
    }

    pub fn total(&self) -> u64 {
        self.songs + self.artists + self.users + self.time + self.songplays
    }
}

/// Outcome of loading a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOutcome {
    /// Rows affected per table; no-op conflicts are not counted
    pub rows: RowCounts,
    /// Song play events dropped because a field could not be mapped
    pub records_skipped: usize,
    /// Log records that were not song plays
    pub records_discarded: usize,
}

/// A file the driver rolled back and skipped
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Statistics for one batch (one input root)
#[derive(Debug, Clone)]
pub struct BatchStats {
    pub kind: DataKind,
    pub root: PathBuf,
    pub files_found: usize,
    pub files_processed: usize,
    pub failed_files: Vec<FailedFile>,
    pub records_skipped: usize,
    pub records_discarded: usize,
    pub rows: RowCounts,
}

impl BatchStats {
    pub fn new(kind: DataKind, root: PathBuf) -> Self {
        Self {
            kind,
            root,
            files_found: 0,
            files_processed: 0,
            failed_files: Vec::new(),
            records_skipped: 0,
            records_discarded: 0,
            rows: RowCounts::default(),
        }
    }

    pub fn files_failed(&self) -> usize {
        self.failed_files.len()
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_processed += 1;
        self.records_skipped += outcome.records_skipped;
        self.records_discarded += outcome.records_discarded;
        self.rows.add(&outcome.rows);
    }
}

/// Statistics for a full run: dimension phase then fact phase
#[derive(Debug, Clone)]
pub struct RunStats {
    pub songs: BatchStats,
    pub logs: BatchStats,
    pub processing_time_ms: u128,
}

impl RunStats {
    pub fn total_rows(&self) -> RowCounts {
        let mut rows = self.songs.rows;
        rows.add(&self.logs.rows);
        rows
    }
}
