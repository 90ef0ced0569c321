//! Song/artist identity lookup for play events.
//!
//! Matching is exact on title, artist name and duration. Durations are
//! compared as stored floating-point values with no tolerance, so a play
//! whose length differs from the song file in the last digit stays
//! unlinked.

use crate::error::Result;
use crate::models::SongMatch;
use sqlx::SqliteConnection;
use tracing::debug;

const SONG_SELECT: &str = r#"
SELECT songs.song_id, artists.artist_id
FROM songs
JOIN artists ON songs.artist_id = artists.artist_id
WHERE songs.title = ?
  AND artists.name = ?
  AND songs.duration = ?
LIMIT 1
"#;

/// Find the song and artist keys for a played track, if loaded
pub async fn resolve_song(
    conn: &mut SqliteConnection,
    title: &str,
    artist_name: &str,
    duration: f64,
) -> Result<Option<SongMatch>> {
    let song_match = sqlx::query_as::<_, SongMatch>(SONG_SELECT)
        .bind(title)
        .bind(artist_name)
        .bind(duration)
        .fetch_optional(&mut *conn)
        .await?;

    if song_match.is_none() {
        debug!(
            "No song matches '{}' by '{}' ({}s)",
            title, artist_name, duration
        );
    }
    Ok(song_match)
}
