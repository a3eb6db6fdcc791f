use std::io::Read;
use serde::Deserialize;
use crate::cursor::StreamCursor;
use crate::errors::DecodeError;
use crate::models::forecast::{ForecastEntry, Parameter};
use crate::models::smhi_forecast::RawEntry;

/// Largest single `timeSeries` object accepted, real entries are around 2 KiB
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024;

/// Key every SMHI entry object starts with, the anchor for finding the next entry after
/// a broken one
pub const ENTRY_KEY: &str = r#""validTime""#;

/// Shortest usable timestamp, i.e. `YYYY-MM-DDTHH:MM:SS`
const MIN_TIMESTAMP_LEN: usize = 19;

/// Decodes the next forecast entry at the cursor position.
///
/// Returns `Ok(None)` when the enclosing array ends instead of another entry starting.
/// A parse failure is reported as `DecodeError::Malformed` and leaves the cursor right
/// after the byte where parsing stopped, the caller is expected to resynchronize on the
/// next entry.
///
/// # Arguments
///
/// * 'cursor' - stream cursor positioned before an entry object
pub fn decode_next<R: Read>(cursor: &mut StreamCursor<R>) -> Result<Option<ForecastEntry>, DecodeError> {
    match cursor.peek_significant()? {
        Some(b'{') => decode_object(b"", cursor).map(Some),
        Some(b']') => {
            cursor.skip_byte();
            Ok(None)
        },
        Some(b) => {
            cursor.skip_byte();
            Err(DecodeError::Malformed(format!("expected an object, found {:?}", b as char)))
        },
        None => Err(DecodeError::Exhausted),
    }
}

/// Decodes an entry whose opening brace and `validTime` key have already been consumed,
/// which is where a scan for `ENTRY_KEY` leaves the cursor.
///
/// # Arguments
///
/// * 'cursor' - stream cursor positioned right after an `ENTRY_KEY`
pub fn decode_resumed<R: Read>(cursor: &mut StreamCursor<R>) -> Result<ForecastEntry, DecodeError> {
    let prefix = format!("{{{}", ENTRY_KEY);
    decode_object(prefix.as_bytes(), cursor)
}

/// Runs serde_json over the cursor, `prefix` standing in for bytes already consumed
fn decode_object<R: Read>(prefix: &[u8], cursor: &mut StreamCursor<R>) -> Result<ForecastEntry, DecodeError> {
    let mut limited = Read::take(&mut *cursor, MAX_ENTRY_BYTES);
    let parsed = {
        let mut de = serde_json::Deserializer::from_reader(prefix.chain(&mut limited));
        RawEntry::deserialize(&mut de)
    };

    match parsed {
        Ok(raw) => into_entry(raw),
        Err(_) if limited.limit() == 0 => {
            Err(DecodeError::Malformed(format!("entry larger than {} bytes", MAX_ENTRY_BYTES)))
        },
        Err(e) => Err(e.into()),
    }
}

/// Validates the timestamp of a structurally sound entry and splits out date and hour
///
/// # Arguments
///
/// * 'raw' - the entry as parsed
fn into_entry(raw: RawEntry) -> Result<ForecastEntry, DecodeError> {
    let valid_time = raw.valid_time
        .ok_or_else(|| DecodeError::Unusable("entry without validTime".to_string()))?;

    if valid_time.len() < MIN_TIMESTAMP_LEN {
        return Err(DecodeError::Unusable(format!("timestamp too short: {:?}", valid_time)));
    }

    let date = valid_time.get(0..10)
        .ok_or_else(|| DecodeError::Unusable(format!("bad date in {:?}", valid_time)))?
        .to_string();
    let hour = valid_time.get(11..13)
        .and_then(|h| h.parse::<u32>().ok())
        .filter(|h| *h < 24)
        .ok_or_else(|| DecodeError::Unusable(format!("bad hour in {:?}", valid_time)))?;

    let parameters = raw.parameters
        .into_iter()
        .map(|p| Parameter { name: p.name, unit: p.unit, values: p.values })
        .collect();

    Ok(ForecastEntry { valid_time, date, hour, parameters })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use crate::cursor::Scan;

    fn cursor(s: &str) -> StreamCursor<io::Cursor<Vec<u8>>> {
        StreamCursor::new(io::Cursor::new(s.as_bytes().to_vec()))
    }

    #[test]
    fn decodes_smhi_entry() {
        let json = r#"{"validTime":"2025-10-23T13:00:00Z","parameters":[
            {"name":"t","levelType":"hl","level":2,"unit":"Cel","values":[8.4]},
            {"name":"Wsymb2","levelType":"hl","level":0,"unit":"category","values":[3]}]}"#;
        let entry = decode_next(&mut cursor(json)).unwrap().unwrap();

        assert_eq!(entry.date, "2025-10-23");
        assert_eq!(entry.hour, 13);
        assert_eq!(entry.parameters.len(), 2);
        assert_eq!(entry.parameters[0].unit, "Cel");
        assert_eq!(entry.value("t"), Some(8.4));
        assert_eq!(entry.weather_code(), 3);
    }

    #[test]
    fn end_of_array_is_not_an_error() {
        assert!(decode_next(&mut cursor("  ]}")).unwrap().is_none());
    }

    #[test]
    fn short_timestamp_is_unusable() {
        let err = decode_next(&mut cursor(r#"{"validTime":"2025-10-23","parameters":[]}"#)).unwrap_err();
        assert!(matches!(err, DecodeError::Unusable(_)));

        let err = decode_next(&mut cursor(r#"{"parameters":[]}"#)).unwrap_err();
        assert!(matches!(err, DecodeError::Unusable(_)));

        let err = decode_next(&mut cursor(r#"{"validTime":"2025-10-23Txx:00:00Z","parameters":[]}"#)).unwrap_err();
        assert!(matches!(err, DecodeError::Unusable(_)));
    }

    #[test]
    fn lone_parameter_object_is_malformed() {
        let json = r#"{"name":"t","levelType":"hl","level":2,"unit":"Cel","values":[8.4]},{"name":"ws"}"#;
        let err = decode_next(&mut cursor(json)).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn oversized_entry_is_malformed() {
        let padding = "x".repeat(MAX_ENTRY_BYTES as usize);
        let json = format!(r#"{{"validTime":"2025-10-23T13:00:00Z","note":"{}","parameters":[]}}"#, padding);
        let err = decode_next(&mut cursor(&json)).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(m) if m.contains("larger than")));
    }

    #[test]
    fn broken_json_is_malformed() {
        let err = decode_next(&mut cursor(r#"{"validTime":"2025-10-23T13:00:00Z","parameters":[1,}"#)).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));

        let err = decode_next(&mut cursor(r#"nul"#)).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn unclosed_entry_leaves_next_entry_reachable() {
        let json = concat!(
            r#"{"validTime":"2025-10-23T08:00:00Z","parameters":[{"name":"t","values":[1]}],"#,
            r#"{"validTime":"2025-10-24T08:00:00Z","parameters":[{"name":"t","values":[2]}]}]"#,
        );
        let mut c = cursor(json);
        assert!(matches!(decode_next(&mut c).unwrap_err(), DecodeError::Malformed(_)));

        assert_eq!(c.scan_to(ENTRY_KEY).unwrap(), Scan::First);
        let entry = decode_resumed(&mut c).unwrap();
        assert_eq!(entry.date, "2025-10-24");
        assert_eq!(entry.value("t"), Some(2.0));
        assert!(decode_next(&mut c).unwrap().is_none());
    }

    #[test]
    fn truncated_stream_is_exhausted() {
        let err = decode_next(&mut cursor(r#"{"validTime":"2025-10-23T13:0"#)).unwrap_err();
        assert!(matches!(err, DecodeError::Exhausted));
    }
}
