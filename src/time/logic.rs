//! Resolves the capture instant of a photo from its exif tags and position.

use super::parsing::{parse_naive, parse_offset_string};
use super::structs::{CaptureTime, TimezoneSource};
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::str::FromStr;
use tzf_rs::DefaultFinder;

// --- Global Timezone Finder ---
static FINDER: std::sync::LazyLock<DefaultFinder> = std::sync::LazyLock::new(DefaultFinder::new);

/// Tags holding the camera-local capture time, best first.
const LOCAL_TIME_TAGS: [&str; 2] = ["DateTimeOriginal", "CreateDate"];

const OFFSET_TAGS: [&str; 2] = ["OffsetTimeOriginal", "OffsetTime"];

fn get_string_field<'a>(exif: &'a Value, field: &str) -> Option<&'a str> {
    exif.get(field).and_then(Value::as_str)
}

fn best_local_time(exif: &Value) -> Option<(NaiveDateTime, &'static str)> {
    LOCAL_TIME_TAGS.into_iter().find_map(|tag| {
        let (dt, _) = parse_naive(get_string_field(exif, tag)?)?;
        Some((dt, tag))
    })
}

fn zoned_by_position(
    naive_dt: &NaiveDateTime,
    latitude: f64,
    longitude: f64,
) -> Option<(Tz, DateTime<Utc>)> {
    let tz = Tz::from_str(FINDER.get_tz_name(longitude, latitude)).ok()?;
    let zoned = match tz.from_local_datetime(naive_dt) {
        LocalResult::Single(zoned) | LocalResult::Ambiguous(zoned, _) => zoned,
        // Inside a spring-forward gap: the clock had not been moved yet.
        LocalResult::None => tz
            .from_local_datetime(&(*naive_dt + Duration::hours(1)))
            .earliest()?,
    };
    Some((tz, zoned.with_timezone(&Utc)))
}

/// Finds the capture time of a photo.
///
/// Returns `None` if no local time tag is present or parseable. The UTC instant is taken
/// from an explicit offset tag, then from the timezone at `position`, and falls back to
/// treating the local time as UTC.
pub fn get_capture_time(exif: &Value, position: Option<(f64, f64)>) -> Option<CaptureTime> {
    let (datetime_local, source_tag) = best_local_time(exif)?;

    // --- Priority 1: explicit offset written by the camera ---
    let explicit_offset = OFFSET_TAGS
        .into_iter()
        .find_map(|tag| parse_offset_string(get_string_field(exif, tag)?));
    if let Some(offset) = explicit_offset
        && let LocalResult::Single(zoned) = offset.from_local_datetime(&datetime_local)
    {
        return Some(CaptureTime {
            datetime_local,
            datetime_utc: zoned.with_timezone(&Utc),
            timezone: Some(offset.to_string()),
            source_tag: source_tag.to_string(),
            timezone_source: TimezoneSource::ExplicitOffset,
        });
    }

    // --- Priority 2: IANA zone at the GPS position ---
    if let Some((latitude, longitude)) = position
        && let Some((tz, datetime_utc)) = zoned_by_position(&datetime_local, latitude, longitude)
    {
        return Some(CaptureTime {
            datetime_local,
            datetime_utc,
            timezone: Some(tz.name().to_string()),
            source_tag: source_tag.to_string(),
            timezone_source: TimezoneSource::GpsLocation,
        });
    }

    // --- Fallback: assume the camera clock ran on UTC ---
    tracing::debug!(source_tag, "No timezone context for capture time, assuming UTC");
    Some(CaptureTime {
        datetime_local,
        datetime_utc: datetime_local.and_utc(),
        timezone: None,
        source_tag: source_tag.to_string(),
        timezone_source: TimezoneSource::AssumedUtc,
    })
}
