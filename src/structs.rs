use crate::features::gps::{Coordinates, LocationName};
use crate::features::sun::SunInfo;
use crate::time::structs::CaptureTime;
use crate::weather::series::{CaptureConditions, WeatherSeries};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A photo with a usable position and capture time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub path: PathBuf,
    pub coordinates: Coordinates,
    pub captured_at: CaptureTime,
    /// Numeric exif orientation (1..=8).
    pub orientation: Option<u64>,
}

impl PhotoRecord {
    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.longitude
    }
}

/// One row of the report: a photo and everything looked up for it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// 1-based row number.
    pub index: usize,
    pub photo: PhotoRecord,
    pub location: Option<LocationName>,
    pub sun_info: Option<SunInfo>,
    /// `None` when the provider had no data for this point.
    pub weather: Option<WeatherSeries>,
    pub conditions: CaptureConditions,
}
