//! Sparkify ETL Library
//!
//! Loads song metadata and listening-event logs, stored as line-delimited
//! JSON files, into a star schema for song play analytics:
//! - `songs`, `artists`, `users` and `time` dimension tables
//! - a `songplays` fact table linking each play to its song and artist
//!
//! Every input file is loaded in its own transaction. Song files are
//! loaded before event logs so plays can be resolved against the full
//! catalogue.

pub mod config;
pub mod constants;
pub mod db;
pub mod decoder;
pub mod error;
pub mod mapping;
pub mod models;
pub mod processor;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{ConflictPolicy, EtlConfig};
pub use error::{EtlError, Result};
pub use models::{BatchStats, DataKind, RowCounts, RunStats};
pub use processor::{BatchProcessor, Pipeline};
