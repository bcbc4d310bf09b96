use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// When a photo was taken, in camera-local time and in UTC.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureTime {
    /// The timestamp as written by the camera, without timezone context.
    pub datetime_local: NaiveDateTime,

    /// The capture instant in UTC. Weather lookups are keyed on this.
    pub datetime_utc: DateTime<Utc>,

    /// IANA name or fixed offset (e.g. "+02:00") used to get from local to UTC.
    pub timezone: Option<String>,

    /// The exif tag the local time was read from.
    pub source_tag: String,

    pub timezone_source: TimezoneSource,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimezoneSource {
    /// `OffsetTimeOriginal` was present.
    ExplicitOffset,
    /// Timezone looked up from the GPS position.
    GpsLocation,
    /// Nothing better was available; local time treated as UTC.
    AssumedUtc,
}
