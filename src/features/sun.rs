use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

/// Sun events on the capture day. An event is `None` when it does not happen that day,
/// e.g. sunset during the midnight sun, or civil dusk in a white night.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SunInfo {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub dawn: Option<DateTime<Utc>>,
    pub dusk: Option<DateTime<Utc>>,
    pub is_daytime: bool,
}

/// Solar declination in degrees, Cooper's approximation.
fn declination(date: NaiveDate) -> f64 {
    let day_of_year = f64::from(date.ordinal());
    23.44 * (std::f64::consts::TAU * (284.0 + day_of_year) / 365.0).sin()
}

/// Without a sunrise or sunset the sun stays up all day when it sits over the same
/// hemisphere as the observer.
fn is_polar_day(latitude: f64, date: NaiveDate) -> bool {
    latitude * declination(date) > 0.0
}

/// Sun events on the capture day at the capture position.
///
/// Returns `None` when the coordinates are rejected by the solar calculator.
pub fn compute_sun_info(datetime: DateTime<Utc>, latitude: f64, longitude: f64) -> Option<SunInfo> {
    let date = datetime.date_naive();
    let coord = Coordinates::new(latitude, longitude)?;
    let day = SolarDay::new(coord, date);

    let sunrise = day.event_time(SolarEvent::Sunrise);
    let sunset = day.event_time(SolarEvent::Sunset);
    let dawn = day.event_time(SolarEvent::Dawn(DawnType::Civil));
    let dusk = day.event_time(SolarEvent::Dusk(DawnType::Civil));

    let is_daytime = match (sunrise, sunset) {
        (Some(rise), Some(set)) => datetime >= rise && datetime <= set,
        _ => is_polar_day(latitude, date),
    };

    Some(SunInfo {
        sunrise,
        sunset,
        dawn,
        dusk,
        is_daytime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_noon_in_amsterdam_is_daytime() {
        let noon = Utc.with_ymd_and_hms(2024, 6, 21, 11, 0, 0).unwrap();
        let info = compute_sun_info(noon, 52.37, 4.89).unwrap();
        assert!(info.is_daytime);
        assert!(info.dawn.unwrap() < info.sunrise.unwrap());
        assert!(info.sunset.unwrap() < info.dusk.unwrap());
    }

    #[test]
    fn test_midnight_in_amsterdam_is_night() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap();
        let info = compute_sun_info(midnight, 52.37, 4.89).unwrap();
        assert!(!info.is_daytime);
    }

    #[test]
    fn test_midnight_sun_in_tromso() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 21, 23, 0, 0).unwrap();
        let info = compute_sun_info(midnight, 69.65, 18.96).unwrap();
        assert!(info.sunrise.is_none());
        assert!(info.sunset.is_none());
        assert!(info.is_daytime);
    }

    #[test]
    fn test_polar_night_in_tromso() {
        let noon = Utc.with_ymd_and_hms(2024, 12, 21, 11, 0, 0).unwrap();
        let info = compute_sun_info(noon, 69.65, 18.96).unwrap();
        assert!(info.sunrise.is_none());
        assert!(!info.is_daytime);
        // The sun still climbs above civil twilight depth at noon.
        assert!(info.dawn.is_some());
    }

    #[test]
    fn test_southern_summer_is_polar_day() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        assert!(is_polar_day(-75.0, date));
        assert!(!is_polar_day(75.0, date));
    }

    #[test]
    fn test_invalid_coordinates() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert!(compute_sun_info(now, 120.0, 4.89).is_none());
    }
}
