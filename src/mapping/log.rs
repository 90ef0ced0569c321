//! Event log records into time, user and songplay rows.
//!
//! Only song play events (`page` containing `NextSong`) contribute rows.
//! The songplay row is left pending until the song and artist keys have
//! been looked up in storage.

use super::FieldReader;
use crate::constants::{SONG_PLAY_PAGE, log_fields};
use crate::error::{EtlError, Result};
use crate::models::{LogEvent, Record, SongMatch, SongplayRow, TimeRow, UserRow};
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, warn};

/// Songplay fact awaiting song/artist resolution
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSongplay {
    pub start_time: NaiveDateTime,
    pub user_id: String,
    pub level: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
}

impl PendingSongplay {
    /// Title, artist name and duration to look up; `None` when any is null
    pub fn lookup_key(&self) -> Option<(&str, &str, f64)> {
        match (&self.song, &self.artist, self.length) {
            (Some(song), Some(artist), Some(length)) => {
                Some((song.as_str(), artist.as_str(), length))
            }
            _ => None,
        }
    }

    /// Complete the fact row with the resolved keys (both null when unmatched)
    pub fn resolve(self, song_match: Option<SongMatch>) -> SongplayRow {
        let (song_id, artist_id) = match song_match {
            Some(m) => (Some(m.song_id), Some(m.artist_id)),
            None => (None, None),
        };

        SongplayRow {
            start_time: self.start_time,
            user_id: self.user_id,
            level: self.level,
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location,
            user_agent: self.user_agent,
        }
    }
}

/// All rows derived from one song play event
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub time: TimeRow,
    pub user: UserRow,
    pub songplay: PendingSongplay,
}

/// A song play event that could not be mapped
#[derive(Debug)]
pub struct SkippedRecord {
    /// Position of the record within the file (0-based)
    pub index: usize,
    pub error: EtlError,
}

/// Mapped contents of one event log file
#[derive(Debug, Default)]
pub struct LogBatch {
    /// Song play events, in file order
    pub events: Vec<PlayEvent>,
    /// Song play events dropped because a field could not be mapped
    pub skipped: Vec<SkippedRecord>,
    /// Records that were not song plays
    pub discarded: usize,
}

/// Whether a record is a song play event.
///
/// Matching is a case-sensitive substring test on `page`; a missing or
/// non-string page is not a song play.
pub fn is_song_play(record: &Record) -> bool {
    record
        .get(log_fields::PAGE)
        .and_then(Value::as_str)
        .is_some_and(|page| page.contains(SONG_PLAY_PAGE))
}

/// Filter a log file's records to song plays and map each one.
///
/// A record that fails to map is skipped without affecting the others.
pub fn map_log_records(records: &[Record]) -> LogBatch {
    let mut batch = LogBatch::default();

    for (index, record) in records.iter().enumerate() {
        if !is_song_play(record) {
            batch.discarded += 1;
            continue;
        }

        match map_play_event(record) {
            Ok(event) => batch.events.push(event),
            Err(error) => {
                warn!("Skipping song play record {}: {}", index, error);
                batch.skipped.push(SkippedRecord { index, error });
            }
        }
    }

    debug!(
        "Mapped {} song plays ({} skipped, {} other events discarded)",
        batch.events.len(),
        batch.skipped.len(),
        batch.discarded
    );
    batch
}

/// Map a single song play record into its time, user and songplay rows
pub fn map_play_event(record: &Record) -> Result<PlayEvent> {
    let event = read_log_event(record)?;
    let time = TimeRow::from_epoch_millis(event.ts)?;

    let user = UserRow {
        user_id: event.user_id.clone(),
        first_name: event.first_name,
        last_name: event.last_name,
        gender: event.gender,
        level: event.level.clone(),
    };

    let songplay = PendingSongplay {
        start_time: time.start_time,
        user_id: event.user_id,
        level: event.level,
        session_id: event.session_id,
        location: event.location,
        user_agent: event.user_agent,
        song: event.song,
        artist: event.artist,
        length: event.length,
    };

    Ok(PlayEvent {
        time,
        user,
        songplay,
    })
}

fn read_log_event(record: &Record) -> Result<LogEvent> {
    let fields = FieldReader::new(record);
    fields.require_all(log_fields::ALL)?;

    Ok(LogEvent {
        ts: fields.get(log_fields::TS)?,
        user_id: parse_user_id(fields.raw(log_fields::USER_ID)?)?,
        first_name: fields.get(log_fields::FIRST_NAME)?,
        last_name: fields.get(log_fields::LAST_NAME)?,
        gender: fields.get(log_fields::GENDER)?,
        level: fields.get(log_fields::LEVEL)?,
        song: fields.get(log_fields::SONG)?,
        artist: fields.get(log_fields::ARTIST)?,
        length: fields.get(log_fields::LENGTH)?,
        session_id: fields.get(log_fields::SESSION_ID)?,
        location: fields.get(log_fields::LOCATION)?,
        user_agent: fields.get(log_fields::USER_AGENT)?,
    })
}

/// Logs carry user ids as strings; numeric ids are accepted as well.
fn parse_user_id(value: &Value) -> Result<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Ok(id.clone()),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(EtlError::mapping(
            log_fields::USER_ID,
            format!("expected a non-empty user id, found {other}"),
        )),
    }
}
