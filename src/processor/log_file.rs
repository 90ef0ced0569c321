//! Log file handler: time, user and songplay rows for each song play.
//!
//! Dimension rows are written before the facts that reference them:
//! every time row, then every user row, then the songplays. Song and
//! artist keys are looked up in storage, so song files must already be
//! loaded.

use crate::db::loader::TableRow;
use crate::db::resolver::resolve_song;
use crate::decoder::decode_json_lines;
use crate::error::Result;
use crate::mapping::map_log_records;
use crate::models::FileOutcome;
use sqlx::SqliteConnection;
use std::path::Path;
use tracing::debug;

/// Decode, map and load one event log file on `conn`
pub async fn process_log_file(
    conn: &mut SqliteConnection,
    file_path: &Path,
) -> Result<FileOutcome> {
    let records = decode_json_lines(file_path)?;
    let batch = map_log_records(&records);

    let mut outcome = FileOutcome {
        records_skipped: batch.skipped.len(),
        records_discarded: batch.discarded,
        ..Default::default()
    };

    for event in &batch.events {
        outcome.rows.time += TableRow::Time(&event.time).load(conn).await?;
    }

    for event in &batch.events {
        outcome.rows.users += TableRow::User(&event.user).load(conn).await?;
    }

    let mut linked = 0usize;
    for event in batch.events {
        let song_match = match event.songplay.lookup_key() {
            Some((title, artist, length)) => resolve_song(conn, title, artist, length).await?,
            None => None,
        };
        if song_match.is_some() {
            linked += 1;
        }

        let songplay = event.songplay.resolve(song_match);
        outcome.rows.songplays += TableRow::Songplay(&songplay).load(conn).await?;
    }

    debug!(
        "Loaded {} songplays ({} linked to a song) from {}",
        outcome.rows.songplays,
        linked,
        file_path.display()
    );
    Ok(outcome)
}
