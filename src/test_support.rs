//! Fixtures shared by the unit tests.
use crate::features::gps::{Coordinates, LocationName};
use crate::structs::{PhotoRecord, ReportEntry};
use crate::time::structs::{CaptureTime, TimezoneSource};
use crate::weather::{CaptureConditions, WeatherSeries, WeatherVariable};
use crate::weather::series::HourlySample;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::path::PathBuf;

pub fn capture_time() -> CaptureTime {
    let datetime_local = NaiveDate::from_ymd_opt(2023, 8, 1)
        .unwrap()
        .and_hms_opt(19, 23, 45)
        .unwrap();
    CaptureTime {
        datetime_local,
        datetime_utc: Utc.with_ymd_and_hms(2023, 8, 1, 17, 23, 45).unwrap(),
        timezone: Some("Europe/Amsterdam".to_string()),
        source_tag: "DateTimeOriginal".to_string(),
        timezone_source: TimezoneSource::GpsLocation,
    }
}

pub fn record(file_name: &str) -> PhotoRecord {
    PhotoRecord {
        path: PathBuf::from(format!("photos/{file_name}")),
        coordinates: Coordinates {
            latitude: 52.379189,
            longitude: 4.899431,
            altitude: None,
        },
        captured_at: capture_time(),
        orientation: Some(1),
    }
}

/// A report row in Amsterdam with fixed conditions except for the temperature.
pub fn entry(index: usize, file_name: &str, temperature: Option<f64>) -> ReportEntry {
    ReportEntry {
        index,
        photo: record(file_name),
        location: Some(LocationName {
            name: "Amsterdam".to_string(),
            admin1: "North Holland".to_string(),
            admin2: String::new(),
            country_code: "NL".to_string(),
            country_name: Some("Netherlands".to_string()),
        }),
        sun_info: None,
        weather: None,
        conditions: CaptureConditions {
            temperature,
            precipitation: Some(0.0),
            wind_speed: Some(3.2),
            relative_humidity: None,
        },
    }
}

/// `hours` hourly samples from 2023-08-01 15:00 UTC with every variable present.
pub fn series(hours: usize) -> WeatherSeries {
    let start = Utc.with_ymd_and_hms(2023, 8, 1, 15, 0, 0).unwrap();
    let samples = (0..hours)
        .map(|h| HourlySample {
            time: start + Duration::hours(h as i64),
            temperature: Some(20.0 + h as f64),
            precipitation: Some(0.1 * h as f64),
            wind_speed: Some(4.0),
            relative_humidity: Some(70.0),
        })
        .collect();
    WeatherSeries {
        latitude: 52.38,
        longitude: 4.9,
        variables: WeatherVariable::ALL.to_vec(),
        samples,
    }
}
