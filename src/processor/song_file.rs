//! Song file handler: one song row and one artist row per file.

use crate::db::loader::TableRow;
use crate::decoder::decode_json_lines;
use crate::error::Result;
use crate::mapping::map_song_records;
use crate::models::FileOutcome;
use sqlx::SqliteConnection;
use std::path::Path;
use tracing::debug;

/// Decode, map and load one song metadata file on `conn`
pub async fn process_song_file(
    conn: &mut SqliteConnection,
    file_path: &Path,
) -> Result<FileOutcome> {
    let records = decode_json_lines(file_path)?;
    let (song, artist) = map_song_records(&records)?;

    let mut outcome = FileOutcome::default();
    outcome.rows.songs = TableRow::Song(&song).load(conn).await?;
    outcome.rows.artists = TableRow::Artist(&artist).load(conn).await?;

    debug!(
        "Loaded song {} by artist {} from {}",
        song.song_id,
        artist.artist_id,
        file_path.display()
    );
    Ok(outcome)
}
