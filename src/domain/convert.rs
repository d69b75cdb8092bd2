// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text conversion routines for scalar values.
//!
//! Source parsers deliver raw text; these functions turn that text into typed
//! values. Each routine is fallible and reports a `TypeConversion` error naming the
//! offending input.

use crate::domain::errors::{RegistryError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::time::Duration;

const NANOS_PER_UNIT: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parses a boolean.
///
/// Recognizes the following values (case-insensitive):
/// - `true`: "1", "t", "true", "on", "yes", "y"
/// - `false`: "0", "f", "false", "off", "no", "n"
///
/// # Examples
///
/// ```
/// use optreg::domain::convert::parse_bool;
///
/// assert!(parse_bool("On").unwrap());
/// assert!(!parse_bool("0").unwrap());
/// assert!(parse_bool("maybe").is_err());
/// ```
pub fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "t" | "true" | "on" | "yes" | "y" => Ok(true),
        "0" | "f" | "false" | "off" | "no" | "n" => Ok(false),
        _ => Err(RegistryError::conversion(
            raw,
            "bool",
            "expected one of 1/0, t/f, true/false, on/off, yes/no",
        )),
    }
}

/// Parses a duration.
///
/// Accepts a sequence of decimal numbers each followed by a unit, such as
/// `"300ms"`, `"1h30m"` or `"2.5s"`. Valid units are `ns`, `us` (or `µs`), `ms`,
/// `s`, `m` and `h`. A bare unsigned integer is read as a number of seconds.
///
/// # Examples
///
/// ```
/// use optreg::domain::convert::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
/// ```
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(RegistryError::conversion(raw, "duration", "empty input"));
    }
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut rest = text;
    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(RegistryError::conversion(
                raw,
                "duration",
                format!("expected a number at '{}'", rest),
            ));
        }
        let number: f64 = rest[..number_end]
            .parse()
            .map_err(|e| RegistryError::from_parse_float_error(raw, "duration", e))?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                let message = if unit.is_empty() {
                    "missing unit".to_string()
                } else {
                    format!("unknown unit '{}'", unit)
                };
                RegistryError::conversion(raw, "duration", message)
            })?;
        total_nanos += number * scale;
        rest = &rest[unit_end..];
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(RegistryError::conversion(raw, "duration", "out of range"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Parses a UTC timestamp.
///
/// RFC 3339 input (`2024-05-01T12:00:00Z`, `2024-05-01T14:00:00+02:00`) is
/// preferred; `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD` are read as UTC.
///
/// # Examples
///
/// ```
/// use optreg::domain::convert::parse_timestamp;
///
/// let ts = parse_timestamp("2024-05-01T14:00:00+02:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-05-01T12:00:00+00:00");
/// ```
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let text = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()),
        Err(e) => Err(RegistryError::conversion(raw, "timestamp", e)),
    }
}

/// Splits comma-separated text into trimmed items.
///
/// Empty (or all-whitespace) input yields no items.
pub fn split_list(raw: &str) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        for val in ["1", "t", "T", "true", "TRUE", "on", "Yes"] {
            assert!(parse_bool(val).unwrap(), "Failed for value: {}", val);
        }
        for val in ["0", "f", "False", "off", "OFF", "no"] {
            assert!(!parse_bool(val).unwrap(), "Failed for value: {}", val);
        }
    }

    #[test]
    fn test_parse_bool_invalid() {
        let err = parse_bool("perhaps").unwrap_err();
        assert!(matches!(err, RegistryError::TypeConversion { .. }));
    }

    #[test]
    fn test_parse_duration_compound() {
        assert_eq!(
            parse_duration("1h2m3s").unwrap(),
            Duration::from_secs(3600 + 120 + 3)
        );
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("15us").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_duration("15µs").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn test_parse_duration_bare_seconds() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration(" 30 ").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("1.5").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("h").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let a = parse_timestamp("2024-05-01T12:00:00Z").unwrap();
        let b = parse_timestamp("2024-05-01 12:00:00").unwrap();
        assert_eq!(a, b);

        let day = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-05-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
        assert!(split_list("   ").is_empty());
        assert_eq!(split_list("single"), vec!["single"]);
    }
}
