//! Row parsing: raw CSV lines into typed rows.
//!
//! A data line is split on commas (fields whitespace-trimmed) and zipped
//! positionally with the header schema. Each field is coerced into a typed
//! value: null, boolean, integer, or string. No quoting or escaping is
//! interpreted; the input format is plain comma-separated text.
//!
//! Also provides encoding auto-detection for operator-supplied files,
//! which are frequently ISO-8859-1 or Windows-1252 exports.

use serde_json::{Map, Value};

use crate::error::RowError;
use crate::schema::HeaderSchema;

/// A parsed row: column name to typed value, per the header schema.
///
/// Columns absent from a short row are simply not present in the map.
pub type TypedRow = Map<String, Value>;

/// Coerce a raw field text into a typed value.
///
/// Priority order:
/// 1. empty string or the literal `null` (case-sensitive) -> null
/// 2. `true` / `false` (case-insensitive) -> boolean
/// 3. text that round-trips as a base-10 integer -> integer
///    (optional leading `+`/`-`, leading zeros tolerated; decimal points
///    and exponents do not qualify; values overflowing i64 stay strings)
/// 4. anything else -> the original string unchanged
pub fn coerce(raw: &str) -> Value {
    if raw.is_empty() || raw == "null" {
        return Value::Null;
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Some(n) = parse_integer(raw) {
        return Value::Number(n.into());
    }
    Value::String(raw.to_string())
}

/// Parse a string as a base-10 integer if it denotes one.
///
/// Accepts an optional single leading sign followed by ASCII digits only,
/// so "12.5" and "1e3" fall through to string. i64 overflow returns None.
fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok()
}

/// Split a trimmed data line into raw field texts.
pub fn split_fields(line: &str) -> Vec<String> {
    line.trim()
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

/// Parse one raw data line into a typed row.
///
/// Returns `Ok(None)` if the line is a duplicate of the header row
/// (silently skipped, not an error). Fails with [`RowError::Format`] if
/// the line has fewer than 2 fields. Excess fields beyond the schema are
/// ignored; short rows leave trailing columns absent.
pub fn parse_row(schema: &HeaderSchema, raw_line: &str) -> Result<Option<TypedRow>, RowError> {
    if schema.is_duplicate_header(raw_line) {
        return Ok(None);
    }

    let fields = split_fields(raw_line);
    if fields.len() < 2 {
        return Err(RowError::Format(format!(
            "expected at least 2 fields, got {}",
            fields.len()
        )));
    }

    let mut row = Map::new();
    for (name, raw) in schema.columns().iter().zip(fields.iter()) {
        row.insert(name.clone(), coerce(raw));
    }

    Ok(Some(row))
}

// =============================================================================
// Encoding auto-detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Read a file and decode it with auto-detected encoding.
pub fn read_file_auto(path: &std::path::Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    Ok(decode_content(&bytes, &encoding))
}
