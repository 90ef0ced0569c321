//! Song metadata records into song and artist rows.

use super::FieldReader;
use crate::constants::song_fields;
use crate::error::{EtlError, Result};
use crate::models::{ArtistRow, Record, SongRecord, SongRow};
use tracing::debug;

/// Project a decoded song record into its song and artist rows
pub fn map_song_record(record: &Record) -> Result<(SongRow, ArtistRow)> {
    let song = read_song_record(record)?;

    let song_row = SongRow {
        song_id: song.song_id,
        title: song.title,
        artist_id: song.artist_id.clone(),
        year: song.year,
        duration: song.duration,
    };
    let artist_row = ArtistRow {
        artist_id: song.artist_id,
        name: song.artist_name,
        location: song.artist_location,
        latitude: song.artist_latitude,
        longitude: song.artist_longitude,
    };

    Ok((song_row, artist_row))
}

/// Map the records of one song file.
///
/// Song files hold a single record; any further lines are ignored.
pub fn map_song_records(records: &[Record]) -> Result<(SongRow, ArtistRow)> {
    let first = records
        .first()
        .ok_or_else(|| EtlError::mapping(song_fields::SONG_ID, "song file holds no records"))?;

    if records.len() > 1 {
        debug!(
            "Song file holds {} records, only the first is loaded",
            records.len()
        );
    }

    map_song_record(first)
}

fn read_song_record(record: &Record) -> Result<SongRecord> {
    let fields = FieldReader::new(record);
    fields.require_all(song_fields::ALL)?;

    Ok(SongRecord {
        song_id: fields.get(song_fields::SONG_ID)?,
        title: fields.get(song_fields::TITLE)?,
        artist_id: fields.get(song_fields::ARTIST_ID)?,
        year: fields.get(song_fields::YEAR)?,
        duration: fields.get(song_fields::DURATION)?,
        artist_name: fields.get(song_fields::ARTIST_NAME)?,
        artist_location: fields.get(song_fields::ARTIST_LOCATION)?,
        artist_latitude: fields.get(song_fields::ARTIST_LATITUDE)?,
        artist_longitude: fields.get(song_fields::ARTIST_LONGITUDE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn pump_it() -> Value {
        json!({
            "num_songs": 1,
            "artist_id": "ARKZO1K1187B9A7F09",
            "artist_latitude": null,
            "artist_longitude": null,
            "artist_location": "",
            "artist_name": "Lincoln Park",
            "song_id": "SOSVNRM12AF72A0F5E",
            "title": "Pump It",
            "duration": 213.9,
            "year": 0
        })
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_map_song_record_projects_both_rows() {
        let (song, artist) = map_song_record(&record(pump_it())).unwrap();

        assert_eq!(
            song,
            SongRow {
                song_id: "SOSVNRM12AF72A0F5E".to_string(),
                title: "Pump It".to_string(),
                artist_id: "ARKZO1K1187B9A7F09".to_string(),
                year: Some(0),
                duration: 213.9,
            }
        );
        assert_eq!(
            artist,
            ArtistRow {
                artist_id: "ARKZO1K1187B9A7F09".to_string(),
                name: Some("Lincoln Park".to_string()),
                location: Some(String::new()),
                latitude: None,
                longitude: None,
            }
        );
    }

    #[test]
    fn test_artist_coordinates_are_projected() {
        let mut value = pump_it();
        value["artist_latitude"] = json!(35.14968);
        value["artist_longitude"] = json!(-90.04892);
        value["artist_location"] = json!("Memphis, TN");

        let (_, artist) = map_song_record(&record(value)).unwrap();
        assert_eq!(artist.latitude, Some(35.14968));
        assert_eq!(artist.longitude, Some(-90.04892));
        assert_eq!(artist.location.as_deref(), Some("Memphis, TN"));
    }

    #[test]
    fn test_missing_field_is_mapping_error() {
        let mut value = pump_it();
        value.as_object_mut().unwrap().remove("artist_location");

        match map_song_record(&record(value)).unwrap_err() {
            EtlError::Mapping { field, .. } => assert_eq!(field, "artist_location"),
            other => panic!("Expected Mapping error, got {other:?}"),
        }
    }

    #[test]
    fn test_null_title_is_mapping_error() {
        let mut value = pump_it();
        value["title"] = Value::Null;

        let error = map_song_record(&record(value)).unwrap_err();
        assert!(matches!(error, EtlError::Mapping { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_only_first_record_of_a_file_is_used() {
        let mut second = pump_it();
        second["song_id"] = json!("SOOTHER");

        let records = vec![record(pump_it()), record(second)];
        let (song, _) = map_song_records(&records).unwrap();
        assert_eq!(song.song_id, "SOSVNRM12AF72A0F5E");
    }

    #[test]
    fn test_empty_song_file_is_mapping_error() {
        assert!(matches!(
            map_song_records(&[]).unwrap_err(),
            EtlError::Mapping { .. }
        ));
    }
}
