//! Storage access: connection setup, schema provisioning, row loading and
//! the song/artist lookup used while loading facts.
//!
//! Every function takes its connection explicitly. A run opens one pool
//! holding a single connection and threads it through the pipeline.

pub mod loader;
pub mod resolver;
pub mod schema;

use crate::error::{EtlError, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

/// Open the storage described by `database_url`.
///
/// Any failure to reach the database is reported as
/// [`EtlError::Connection`], which aborts a run.
pub async fn connect(database_url: &str, create_if_missing: bool) -> Result<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        return Err(EtlError::configuration(format!(
            "Unsupported database URL '{}': expected a sqlite: URL",
            database_url
        )));
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| {
            EtlError::configuration(format!("Invalid database URL '{}': {}", database_url, e))
        })?
        .create_if_missing(create_if_missing)
        .foreign_keys(true);

    debug!("Connecting to {}", database_url);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(EtlError::Connection)
}
