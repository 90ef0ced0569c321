//! Line-delimited JSON decoding.
//!
//! Turns an input file into the ordered list of records it holds, one
//! JSON object per line. No filtering or shaping happens here.

use crate::error::{EtlError, Result};
use crate::models::Record;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Decode every non-blank line of `file_path` as a JSON object, in file order
pub fn decode_json_lines(file_path: &Path) -> Result<Vec<Record>> {
    let file = File::open(file_path).map_err(|source| EtlError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| EtlError::FileRead {
            path: file_path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        records.push(decode_line(file_path, index + 1, &line)?);
    }

    debug!("Decoded {} records from {}", records.len(), file_path.display());
    Ok(records)
}

fn decode_line(file_path: &Path, line_number: usize, line: &str) -> Result<Record> {
    let decode_error = |reason: String| EtlError::Decode {
        path: file_path.to_path_buf(),
        line: line_number,
        reason,
    };

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(decode_error(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(decode_error(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
