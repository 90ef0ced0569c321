//! Command-line argument definitions for the Sparkify loader
//!
//! Defines the CLI using the clap derive API. Storage and input roots can
//! also come from the environment (`DATABASE_URL`, `SPARKIFY_SONG_DATA`,
//! `SPARKIFY_LOG_DATA`); flags take precedence.

use crate::config::{ConflictPolicy, EtlConfig};
use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_LOG_DATA, DEFAULT_SONG_DATA};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Sparkify loader
///
/// Loads song metadata and listening-event logs, stored as line-delimited
/// JSON, into a star schema for song play analytics.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sparkify-etl",
    version,
    arg_required_else_help = true,
    about = "Load Sparkify song metadata and event logs into a star-schema database",
    long_about = "Loads song metadata files and listening-event log files (line-delimited JSON) \
                  into a star schema: songs, artists, users and time dimensions around a \
                  songplays fact table. Each input file is loaded in its own transaction."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Target database (sqlite: URL)
    #[arg(
        long = "database-url",
        env = "DATABASE_URL",
        value_name = "URL",
        default_value = DEFAULT_DATABASE_URL,
        global = true
    )]
    pub database_url: String,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress output except errors"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Create the star schema tables
    Init(InitArgs),
    /// Load song files, then event log files
    Load(LoadArgs),
}

/// Arguments for the init command
#[derive(Debug, Clone, Parser)]
pub struct InitArgs {
    /// Drop existing tables first, discarding all loaded rows
    #[arg(long = "drop")]
    pub drop: bool,
}

/// Arguments for the load command
#[derive(Debug, Clone, Parser)]
pub struct LoadArgs {
    /// Root of the song metadata files
    #[arg(
        long = "song-data",
        env = "SPARKIFY_SONG_DATA",
        value_name = "PATH",
        default_value = DEFAULT_SONG_DATA
    )]
    pub song_data: PathBuf,

    /// Root of the event log files
    #[arg(
        long = "log-data",
        env = "SPARKIFY_LOG_DATA",
        value_name = "PATH",
        default_value = DEFAULT_LOG_DATA
    )]
    pub log_data: PathBuf,

    /// What to do when a file violates a table constraint
    ///
    /// `abort` stops the run at the offending file. `skip` rolls that file
    /// back and carries on with the next one.
    #[arg(
        long = "on-conflict",
        value_enum,
        value_name = "POLICY",
        default_value = "abort"
    )]
    pub on_conflict: ConflictPolicy,

    /// Disable progress bars
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Format of the final report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the final report"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for the load report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the appropriate log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl LoadArgs {
    /// Build the run configuration from these arguments
    pub fn to_config(&self, database_url: &str, show_progress: bool) -> EtlConfig {
        EtlConfig::default()
            .with_song_data(&self.song_data)
            .with_log_data(&self.log_data)
            .with_database_url(database_url)
            .with_conflict_policy(self.on_conflict)
            .with_progress(show_progress && !self.no_progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_args_parsing() {
        let args = Args::try_parse_from([
            "sparkify-etl",
            "--database-url",
            "sqlite://test.db",
            "load",
            "--song-data",
            "songs",
            "--log-data",
            "logs",
            "--on-conflict",
            "skip",
            "--no-progress",
        ])
        .unwrap();

        assert_eq!(args.database_url, "sqlite://test.db");
        let Commands::Load(load) = &args.command else {
            panic!("Expected load command");
        };
        assert_eq!(load.on_conflict, ConflictPolicy::Skip);
        assert_eq!(load.output_format, OutputFormat::Human);

        let config = load.to_config(&args.database_url, args.show_progress());
        assert_eq!(config.song_data_path, PathBuf::from("songs"));
        assert_eq!(config.log_data_path, PathBuf::from("logs"));
        assert_eq!(config.database_url, "sqlite://test.db");
        assert!(!config.show_progress);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["sparkify-etl", "init", "--drop", "-vv"]).unwrap();

        assert!(matches!(args.command, Commands::Init(InitArgs { drop: true })));
        assert_eq!(args.get_log_level(), "trace");
    }

    #[test]
    fn test_log_levels() {
        let args = Args::try_parse_from(["sparkify-etl", "init"]).unwrap();
        assert_eq!(args.get_log_level(), "info");
        assert!(args.show_progress());

        let args = Args::try_parse_from(["sparkify-etl", "--quiet", "init"]).unwrap();
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["sparkify-etl", "-q", "-v", "init"]).is_err());
    }

    #[test]
    fn test_unknown_conflict_policy_is_rejected() {
        assert!(
            Args::try_parse_from(["sparkify-etl", "load", "--on-conflict", "replace"]).is_err()
        );
    }
}
