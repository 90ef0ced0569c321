//! Batch driver tests against a file-backed SQLite warehouse.

pub mod error_handling;

use crate::config::EtlConfig;
use crate::db::{connect, schema};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PUMP_IT_TS: i64 = 1541121934796;

/// Empty warehouse plus song and log roots inside one temp directory
pub struct TestWarehouse {
    _temp_dir: TempDir,
    pub pool: SqlitePool,
    pub config: EtlConfig,
    pub song_root: PathBuf,
    pub log_root: PathBuf,
}

impl TestWarehouse {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let song_root = temp_dir.path().join("song_data");
        let log_root = temp_dir.path().join("log_data");
        fs::create_dir_all(&song_root).unwrap();
        fs::create_dir_all(&log_root).unwrap();

        let url = format!("sqlite://{}", temp_dir.path().join("sparkify.db").display());
        let pool = connect(&url, true).await.unwrap();
        schema::create_tables(&pool).await.unwrap();

        let config = EtlConfig::default()
            .with_song_data(&song_root)
            .with_log_data(&log_root)
            .with_database_url(url)
            .with_progress(false);

        Self {
            _temp_dir: temp_dir,
            pool,
            config,
            song_root,
            log_root,
        }
    }

    pub async fn count(&self, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn user_level(&self, user_id: &str) -> Option<String> {
        sqlx::query_scalar("SELECT level FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// Write records as line-delimited JSON, creating parent directories
pub fn write_json_lines(root: &Path, relative: &str, records: &[Value]) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let lines: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

pub fn song_record(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist: &str,
    duration: f64,
) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0
    })
}

pub fn pump_it_song() -> Value {
    song_record(
        "SOSVNRM12AF72A0F5E",
        "Pump It",
        "ARKZO1K1187B9A7F09",
        "Lincoln Park",
        213.9,
    )
}

/// A `NextSong` event for user 39 in session 38
pub fn song_play(
    ts: i64,
    level: &str,
    song: Option<&str>,
    artist: Option<&str>,
    length: Option<f64>,
) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Walter",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Frye",
        "length": length,
        "level": level,
        "location": "San Francisco-Oakland-Hayward, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540919166796.0,
        "sessionId": 38,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_4)",
        "userId": "39"
    })
}

pub fn pump_it_play(ts: i64, level: &str) -> Value {
    song_play(ts, level, Some("Pump It"), Some("Lincoln Park"), Some(213.9))
}

/// A non-song-play event
pub fn page_event(page: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Walter",
        "gender": "M",
        "lastName": "Frye",
        "length": null,
        "level": "free",
        "location": "San Francisco-Oakland-Hayward, CA",
        "page": page,
        "sessionId": 38,
        "song": null,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": "39"
    })
}
