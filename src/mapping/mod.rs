//! Record shaping: decoded JSON records into table rows.
//!
//! Mapping is pure. Song files yield a song row and an artist row; event
//! logs yield time, user and (unresolved) songplay rows for each song play.

pub mod log;
pub mod song;

pub use log::{LogBatch, PlayEvent, map_log_records};
pub use song::{map_song_record, map_song_records};

use crate::error::{EtlError, Result};
use crate::models::Record;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Typed access to the fields of one decoded record.
///
/// A projected field must be present; whether `null` is accepted depends
/// on the requested type (`Option<T>` accepts it).
pub(crate) struct FieldReader<'a> {
    record: &'a Record,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(record: &'a Record) -> Self {
        Self { record }
    }

    /// Fail unless every field in `fields` is present
    pub(crate) fn require_all(&self, fields: &[&str]) -> Result<()> {
        match fields.iter().find(|f| !self.record.contains_key(**f)) {
            Some(missing) => Err(EtlError::mapping(*missing, "field is missing")),
            None => Ok(()),
        }
    }

    pub(crate) fn raw(&self, field: &str) -> Result<&'a Value> {
        self.record
            .get(field)
            .ok_or_else(|| EtlError::mapping(field, "field is missing"))
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, field: &str) -> Result<T> {
        let value = self.raw(field)?;
        T::deserialize(value).map_err(|e| EtlError::mapping(field, e.to_string()))
    }
}
