//! Star schema DDL.
//!
//! Provisioning runs once, before any load, through the `init` command.
//! Loading never creates or drops tables.

use crate::error::Result;
use sqlx::SqlitePool;
use tracing::info;

const USERS_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY NOT NULL,
    first_name TEXT,
    last_name  TEXT,
    gender     TEXT,
    level      TEXT
)
"#;

const SONGS_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    song_id   TEXT PRIMARY KEY NOT NULL,
    title     TEXT NOT NULL,
    artist_id TEXT NOT NULL,
    year      INTEGER,
    duration  REAL NOT NULL
)
"#;

const ARTISTS_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY NOT NULL,
    name      TEXT,
    location  TEXT,
    latitude  REAL,
    longitude REAL
)
"#;

const TIME_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS time (
    start_time TIMESTAMP PRIMARY KEY NOT NULL,
    hour       INTEGER,
    day        INTEGER,
    week       INTEGER,
    month      INTEGER,
    year       INTEGER,
    weekday    INTEGER
)
"#;

const SONGPLAYS_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS songplays (
    songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time  TIMESTAMP NOT NULL REFERENCES time (start_time),
    user_id     TEXT NOT NULL REFERENCES users (user_id),
    level       TEXT,
    song_id     TEXT REFERENCES songs (song_id),
    artist_id   TEXT REFERENCES artists (artist_id),
    session_id  INTEGER,
    location    TEXT,
    user_agent  TEXT,
    UNIQUE (start_time, user_id, session_id)
)
"#;

/// Creation order: referenced tables before songplays
const CREATE_TABLES: &[&str] = &[
    USERS_CREATE,
    SONGS_CREATE,
    ARTISTS_CREATE,
    TIME_CREATE,
    SONGPLAYS_CREATE,
];

/// Drop order: songplays first, it references the rest
const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS songplays",
    "DROP TABLE IF EXISTS users",
    "DROP TABLE IF EXISTS songs",
    "DROP TABLE IF EXISTS artists",
    "DROP TABLE IF EXISTS time",
];

/// Create all five tables if they do not exist
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    for statement in CREATE_TABLES {
        sqlx::query(*statement).execute(pool).await?;
    }
    info!("Star schema tables created");
    Ok(())
}

/// Drop all five tables if they exist
pub async fn drop_tables(pool: &SqlitePool) -> Result<()> {
    for statement in DROP_TABLES {
        sqlx::query(*statement).execute(pool).await?;
    }
    info!("Star schema tables dropped");
    Ok(())
}

/// Drop and recreate the schema, discarding all loaded rows
pub async fn reset(pool: &SqlitePool) -> Result<()> {
    drop_tables(pool).await?;
    create_tables(pool).await
}
