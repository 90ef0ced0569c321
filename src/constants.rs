//! Application constants for the Sparkify loader
//!
//! Default locations, source field names and table names used throughout
//! the pipeline.

// =============================================================================
// Input Locations
// =============================================================================

/// Default root of the song metadata files
pub const DEFAULT_SONG_DATA: &str = "data/song_data";

/// Default root of the event log files
pub const DEFAULT_LOG_DATA: &str = "data/log_data";

/// Extension of input files, matched case-sensitively
pub const INPUT_EXTENSION: &str = "json";

/// Default storage connection descriptor
pub const DEFAULT_DATABASE_URL: &str = "sqlite://sparkify.db";

// =============================================================================
// Event Log Filtering
// =============================================================================

/// Page value marking a song play event
pub const SONG_PLAY_PAGE: &str = "NextSong";

// =============================================================================
// Source Field Names
// =============================================================================

/// Fields projected out of a song metadata record
pub mod song_fields {
    pub const SONG_ID: &str = "song_id";
    pub const TITLE: &str = "title";
    pub const ARTIST_ID: &str = "artist_id";
    pub const YEAR: &str = "year";
    pub const DURATION: &str = "duration";
    pub const ARTIST_NAME: &str = "artist_name";
    pub const ARTIST_LOCATION: &str = "artist_location";
    pub const ARTIST_LATITUDE: &str = "artist_latitude";
    pub const ARTIST_LONGITUDE: &str = "artist_longitude";

    pub const ALL: &[&str] = &[
        SONG_ID,
        TITLE,
        ARTIST_ID,
        YEAR,
        DURATION,
        ARTIST_NAME,
        ARTIST_LOCATION,
        ARTIST_LATITUDE,
        ARTIST_LONGITUDE,
    ];
}

/// Fields projected out of an event log record
pub mod log_fields {
    pub const TS: &str = "ts";
    pub const PAGE: &str = "page";
    pub const USER_ID: &str = "userId";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const GENDER: &str = "gender";
    pub const LEVEL: &str = "level";
    pub const SONG: &str = "song";
    pub const ARTIST: &str = "artist";
    pub const LENGTH: &str = "length";
    pub const SESSION_ID: &str = "sessionId";
    pub const LOCATION: &str = "location";
    pub const USER_AGENT: &str = "userAgent";

    /// Fields every song play event must carry
    pub const ALL: &[&str] = &[
        TS, USER_ID, FIRST_NAME, LAST_NAME, GENDER, LEVEL, SONG, ARTIST, LENGTH, SESSION_ID,
        LOCATION, USER_AGENT,
    ];
}

// =============================================================================
// Target Tables
// =============================================================================

pub mod tables {
    pub const SONGS: &str = "songs";
    pub const ARTISTS: &str = "artists";
    pub const USERS: &str = "users";
    pub const TIME: &str = "time";
    pub const SONGPLAYS: &str = "songplays";
}
