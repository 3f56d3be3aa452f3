//! Helpers for loosely-typed wire values.
//!
//! Monitoring APIs encode the same field as a number in one version and as a
//! stringified number in the next. [`WireValue`] accepts both; the helpers
//! turn it into typed values or a [`BackendError::MalformedPayload`].

use chrono::{DateTime, TimeZone, Utc};
use nagstat_core::{Attempt, BackendError, BackendResult, Status};
use serde::Deserialize;
use std::fmt;

/// A scalar that may arrive as number, string or bool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// String, possibly holding a number.
    Text(String),
}

impl WireValue {
    /// Returns the integer value, parsing strings and integral floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Self::Float(_) => None,
            Self::Bool(v) => Some(i64::from(*v)),
            Self::Text(v) => v.trim().parse().ok(),
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Parses an integer field.
pub fn int_field(value: &WireValue, field: &str, raw: &str) -> BackendResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| BackendError::malformed(format!("{field} is not an integer: {value}"), raw))
}

/// Parses a `"0"`/`"1"` style flag; any positive integer counts as set.
pub fn flag_field(value: &WireValue, field: &str, raw: &str) -> BackendResult<bool> {
    match value.as_i64() {
        Some(0) => Ok(false),
        Some(v) if v > 0 => Ok(true),
        _ => Err(BackendError::malformed(
            format!("{field} is not a flag: {value}"),
            raw,
        )),
    }
}

/// Parses a unix timestamp; `0` means "never".
pub fn timestamp_field(
    value: &WireValue,
    field: &str,
    raw: &str,
) -> BackendResult<Option<DateTime<Utc>>> {
    let secs = int_field(value, field, raw)?;
    if secs == 0 {
        return Ok(None);
    }
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(Some)
        .ok_or_else(|| BackendError::malformed(format!("{field} out of range: {secs}"), raw))
}

/// Builds an attempt pair from two integer fields.
pub fn attempt_fields(current: &WireValue, max: &WireValue, raw: &str) -> BackendResult<Attempt> {
    let to_u32 = |value: &WireValue, field: &str| -> BackendResult<u32> {
        let v = int_field(value, field, raw)?;
        u32::try_from(v).map_err(|_| BackendError::malformed(format!("{field} out of range: {v}"), raw))
    };
    Ok(Attempt::new(
        to_u32(current, "current attempt")?,
        to_u32(max, "max attempts")?,
    ))
}

/// Maps a wire label through a closed, backend-declared table.
///
/// Matching ignores case. Labels outside the table are malformed.
pub fn map_label(table: &[(&str, Status)], label: &str, kind: &str, raw: &str) -> BackendResult<Status> {
    table
        .iter()
        .find(|(wire, _)| wire.eq_ignore_ascii_case(label.trim()))
        .map(|(_, status)| *status)
        .ok_or_else(|| BackendError::malformed(format!("unmapped {kind} state '{label}'"), raw))
}

/// Maps a numeric wire code through a closed, backend-declared table.
pub fn map_code(table: &[(i64, Status)], value: &WireValue, kind: &str, raw: &str) -> BackendResult<Status> {
    let code = int_field(value, &format!("{kind} state"), raw)?;
    table
        .iter()
        .find(|(wire, _)| *wire == code)
        .map(|(_, status)| *status)
        .ok_or_else(|| BackendError::malformed(format!("unmapped {kind} state code {code}"), raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> WireValue {
        WireValue::Text(s.to_string())
    }

    #[test]
    fn test_stringified_flags() {
        assert!(!flag_field(&text("0"), "f", "").unwrap());
        assert!(flag_field(&text("1"), "f", "").unwrap());
        assert!(flag_field(&WireValue::Int(2), "f", "").unwrap());
        assert!(flag_field(&text("yes"), "f", "").is_err());
        assert!(flag_field(&WireValue::Int(-1), "f", "").is_err());
    }

    #[test]
    fn test_wire_value_deserializes_mixed_types() {
        let values: Vec<WireValue> = serde_json::from_str(r#"[1, "2", 3.0, true]"#).unwrap();
        let ints: Vec<_> = values.iter().map(WireValue::as_i64).collect();
        assert_eq!(ints, vec![Some(1), Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn test_timestamp_zero_is_never() {
        assert_eq!(timestamp_field(&WireValue::Int(0), "last_check", "").unwrap(), None);
        let ts = timestamp_field(&text("1700000000"), "last_check", "").unwrap();
        assert_eq!(ts.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_map_code_rejects_unknown() {
        let table = [(0, Status::Ok), (1, Status::Warning)];
        assert_eq!(map_code(&table, &WireValue::Int(1), "service", "").unwrap(), Status::Warning);
        let err = map_code(&table, &WireValue::Int(9), "service", "[..]").unwrap_err();
        assert!(matches!(err, BackendError::MalformedPayload { .. }));
    }

    #[test]
    fn test_map_label_ignores_case() {
        let table = [("critical", Status::Critical)];
        assert_eq!(map_label(&table, "CRITICAL", "host", "").unwrap(), Status::Critical);
        assert!(map_label(&table, "sideways", "host", "").is_err());
    }

    #[test]
    fn test_attempt_fields() {
        let attempt = attempt_fields(&text("2"), &text("3"), "").unwrap();
        assert_eq!(attempt.to_string(), "2/3");
        assert!(attempt_fields(&text("-1"), &text("3"), "").is_err());
    }
}
