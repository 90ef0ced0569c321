//! Error handling for the load pipeline.
//!
//! Errors fall into three groups: file-level failures (read, decode,
//! mapping) that abandon one input file, constraint violations governed by
//! the configured conflict policy, and storage failures that stop the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Directory traversal failed under {root}")]
    DirectoryTraversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Malformed JSON in {path} at line {line}: {reason}")]
    Decode {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Cannot map field '{field}': {reason}")]
    Mapping { field: String, reason: String },

    #[error("Constraint violation on table {table}: {message}")]
    ConstraintViolation { table: String, message: String },

    #[error("Storage unreachable: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Run aborted at file {path}")]
    FileAborted {
        path: PathBuf,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    pub fn mapping(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Mapping {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Errors confined to a single input file. The batch driver rolls the
    /// file back and moves on to the next one.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. } | Self::Decode { .. } | Self::Mapping { .. }
        )
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Classify a driver error raised while writing to `table`. Unique and
    /// foreign-key violations become [`EtlError::ConstraintViolation`].
    pub fn from_write(table: &str, error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() || db_error.is_foreign_key_violation() {
                return Self::ConstraintViolation {
                    table: table.to_string(),
                    message: db_error.message().to_string(),
                };
            }
        }
        Self::from(error)
    }
}

impl From<sqlx::Error> for EtlError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(error),
            other => Self::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_level_classification() {
        let decode = EtlError::Decode {
            path: PathBuf::from("a.json"),
            line: 3,
            reason: "expected value".to_string(),
        };
        assert!(decode.is_file_level());
        assert!(EtlError::mapping("ts", "missing").is_file_level());

        let violation = EtlError::ConstraintViolation {
            table: "songplays".to_string(),
            message: "UNIQUE constraint failed".to_string(),
        };
        assert!(!violation.is_file_level());
        assert!(violation.is_constraint_violation());
    }

    #[test]
    fn test_pool_errors_are_connection_errors() {
        let error = EtlError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, EtlError::Connection(_)));

        let error = EtlError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, EtlError::Database(_)));
    }

    #[test]
    fn test_decode_error_message_names_line() {
        let error = EtlError::Decode {
            path: PathBuf::from("log_data/2018-11-01-events.json"),
            line: 7,
            reason: "EOF while parsing".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("2018-11-01-events.json"));
        assert!(message.contains("line 7"));
    }
}
