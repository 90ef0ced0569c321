//! Row loading with per-table conflict policies.
//!
//! | table     | on key conflict                               |
//! |-----------|-----------------------------------------------|
//! | songs     | keep the stored row                           |
//! | artists   | keep the stored row                           |
//! | users     | overwrite `level` only                        |
//! | time      | keep the stored row                           |
//! | songplays | unique (start_time, user_id, session_id) fails |
//!
//! Each load is a single statement on the caller's connection, normally
//! the transaction that covers the current input file.

use crate::constants::tables;
use crate::error::{EtlError, Result};
use crate::models::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
use sqlx::SqliteConnection;
use tracing::debug;

const SONG_INSERT: &str = r#"
INSERT INTO songs (song_id, title, artist_id, year, duration)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT (song_id) DO NOTHING
"#;

const ARTIST_INSERT: &str = r#"
INSERT INTO artists (artist_id, name, location, latitude, longitude)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT (artist_id) DO NOTHING
"#;

const USER_UPSERT: &str = r#"
INSERT INTO users (user_id, first_name, last_name, gender, level)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT (user_id) DO UPDATE SET level = excluded.level
"#;

const TIME_INSERT: &str = r#"
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (start_time) DO NOTHING
"#;

const SONGPLAY_INSERT: &str = r#"
INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// A row addressed to its target table
#[derive(Debug, Clone, Copy)]
pub enum TableRow<'a> {
    Song(&'a SongRow),
    Artist(&'a ArtistRow),
    User(&'a UserRow),
    Time(&'a TimeRow),
    Songplay(&'a SongplayRow),
}

impl TableRow<'_> {
    pub fn table(&self) -> &'static str {
        match self {
            TableRow::Song(_) => tables::SONGS,
            TableRow::Artist(_) => tables::ARTISTS,
            TableRow::User(_) => tables::USERS,
            TableRow::Time(_) => tables::TIME,
            TableRow::Songplay(_) => tables::SONGPLAYS,
        }
    }

    /// Apply the row with its table's conflict policy.
    ///
    /// Returns the number of rows written (0 when a conflict was ignored).
    pub async fn load(&self, conn: &mut SqliteConnection) -> Result<u64> {
        match self {
            TableRow::Song(row) => insert_song(conn, row).await,
            TableRow::Artist(row) => insert_artist(conn, row).await,
            TableRow::User(row) => upsert_user(conn, row).await,
            TableRow::Time(row) => insert_time(conn, row).await,
            TableRow::Songplay(row) => insert_songplay(conn, row).await,
        }
    }
}

pub async fn insert_song(conn: &mut SqliteConnection, row: &SongRow) -> Result<u64> {
    let result = sqlx::query(SONG_INSERT)
        .bind(&row.song_id)
        .bind(&row.title)
        .bind(&row.artist_id)
        .bind(row.year)
        .bind(row.duration)
        .execute(&mut *conn)
        .await
        .map_err(|e| EtlError::from_write(tables::SONGS, e))?;

    if result.rows_affected() == 0 {
        debug!("Song {} already loaded", row.song_id);
    }
    Ok(result.rows_affected())
}

pub async fn insert_artist(conn: &mut SqliteConnection, row: &ArtistRow) -> Result<u64> {
    let result = sqlx::query(ARTIST_INSERT)
        .bind(&row.artist_id)
        .bind(&row.name)
        .bind(&row.location)
        .bind(row.latitude)
        .bind(row.longitude)
        .execute(&mut *conn)
        .await
        .map_err(|e| EtlError::from_write(tables::ARTISTS, e))?;

    if result.rows_affected() == 0 {
        debug!("Artist {} already loaded", row.artist_id);
    }
    Ok(result.rows_affected())
}

/// Insert a user, or refresh the subscription level of a known one.
/// Name and gender of a known user are left as first loaded.
pub async fn upsert_user(conn: &mut SqliteConnection, row: &UserRow) -> Result<u64> {
    let result = sqlx::query(USER_UPSERT)
        .bind(&row.user_id)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.gender)
        .bind(&row.level)
        .execute(&mut *conn)
        .await
        .map_err(|e| EtlError::from_write(tables::USERS, e))?;

    Ok(result.rows_affected())
}

pub async fn insert_time(conn: &mut SqliteConnection, row: &TimeRow) -> Result<u64> {
    let result = sqlx::query(TIME_INSERT)
        .bind(row.start_time)
        .bind(row.hour)
        .bind(row.day)
        .bind(row.week)
        .bind(row.month)
        .bind(row.year)
        .bind(row.weekday)
        .execute(&mut *conn)
        .await
        .map_err(|e| EtlError::from_write(tables::TIME, e))?;

    Ok(result.rows_affected())
}

/// Insert a fact row. A second play with the same start time, user and
/// session is a [`EtlError::ConstraintViolation`].
pub async fn insert_songplay(conn: &mut SqliteConnection, row: &SongplayRow) -> Result<u64> {
    let result = sqlx::query(SONGPLAY_INSERT)
        .bind(row.start_time)
        .bind(&row.user_id)
        .bind(&row.level)
        .bind(&row.song_id)
        .bind(&row.artist_id)
        .bind(row.session_id)
        .bind(&row.location)
        .bind(&row.user_agent)
        .execute(&mut *conn)
        .await
        .map_err(|e| EtlError::from_write(tables::SONGPLAYS, e))?;

    Ok(result.rows_affected())
}
