//! Utility functions for parsing exif date and offset strings into chrono types.

use chrono::{FixedOffset, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;

static OFFSET_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})$").ok());

/// Parses a naive datetime string commonly found in EXIF (YYYY:MM:DD HH:MM:SS[.fff]).
/// Returns the NaiveDateTime and a boolean indicating if subseconds were present in the string.
pub fn parse_naive(s: &str) -> Option<(NaiveDateTime, bool)> {
    let formats = [
        ("%Y:%m:%d %H:%M:%S%.f", true),
        ("%Y-%m-%d %H:%M:%S%.f", true),
        ("%Y:%m:%d %H:%M:%S", false),
        ("%Y-%m-%d %H:%M:%S", false),
    ];

    let s = s.trim();
    for (fmt, has_subsecs_in_fmt) in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            let parsed_subsecs = has_subsecs_in_fmt && dt.nanosecond() != 0;
            return Some((dt, parsed_subsecs));
        }
    }
    None
}

/// Parses an offset string like "+02:00", "-0500", or "Z".
pub fn parse_offset_string(offset_str: &str) -> Option<FixedOffset> {
    let offset_str = offset_str.trim();
    if offset_str == "Z" {
        return FixedOffset::east_opt(0);
    }
    let caps = OFFSET_PATTERN.as_ref()?.captures(offset_str)?;
    let sign = if caps.get(1)?.as_str() == "-" { -1 } else { 1 };
    let hours = caps.get(2)?.as_str().parse::<i32>().ok()?;
    let minutes = caps.get(3)?.as_str().parse::<i32>().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_naive_exif_format() {
        let (dt, subsec) = parse_naive("2023:08:01 19:23:45").unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 8, 1)
            .unwrap()
            .and_hms_opt(19, 23, 45)
            .unwrap();
        assert_eq!(dt, expected);
        assert!(!subsec);
    }

    #[test]
    fn test_parse_naive_with_subseconds() {
        let (dt, subsec) = parse_naive("2023:08:01 19:23:45.120").unwrap();
        assert_eq!(dt.nanosecond(), 120_000_000);
        assert!(subsec);
    }

    #[test]
    fn test_parse_naive_rejects_placeholder_dates() {
        assert!(parse_naive("0000:00:00 00:00:00").is_none());
        assert!(parse_naive("").is_none());
        assert!(parse_naive("yesterday").is_none());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset_string("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_offset_string("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_offset_string("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_offset_string("+25:00").is_none());
        assert!(parse_offset_string("02:00").is_none());
    }
}
