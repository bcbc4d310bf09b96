use regex::Regex;
use reverse_geocoder::ReverseGeocoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Decimal places kept for coordinates stored in a photo record.
pub const RECORD_PRECISION: i32 = 6;

static DMS_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\d+(?:\.\d+)?)\s*deg(?:\s+(\d+(?:\.\d+)?)')?(?:\s+(\d+(?:\.\d+)?)")?\s*([NSEW])?\s*$"#,
    )
    .ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    const fn limit(self) -> f64 {
        match self {
            Self::Latitude => 90.0,
            Self::Longitude => 180.0,
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Latitude => "GPSLatitude",
            Self::Longitude => "GPSLongitude",
        }
    }

    const fn ref_tag(self) -> &'static str {
        match self {
            Self::Latitude => "GPSLatitudeRef",
            Self::Longitude => "GPSLongitudeRef",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationName {
    pub name: String,
    pub admin1: String,
    pub admin2: String,
    pub country_code: String,
    pub country_name: Option<String>,
}

impl LocationName {
    /// "Amsterdam, North Holland, Netherlands", skipping empty parts.
    pub fn display(&self) -> String {
        let country = self
            .country_name
            .clone()
            .unwrap_or_else(|| self.country_code.clone());
        [self.name.as_str(), self.admin1.as_str(), country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Converts degrees, minutes and seconds to decimal degrees.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn hemisphere_sign(hemisphere: &str) -> Option<f64> {
    match hemisphere.trim() {
        "N" | "North" | "E" | "East" => Some(1.0),
        "S" | "South" | "W" | "West" => Some(-1.0),
        _ => None,
    }
}

/// Parses exiftool's print-converted angle, e.g. `40 deg 49' 15.20" N`.
///
/// Returns the unsigned decimal value and the hemisphere letter if present.
pub fn parse_dms(value: &str) -> Option<(f64, Option<char>)> {
    let caps = DMS_PATTERN.as_ref()?.captures(value)?;
    let degrees: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
    let seconds: f64 = caps.get(3).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    let hemisphere = caps.get(4).and_then(|m| m.as_str().chars().next());
    Some((dms_to_decimal(degrees, minutes, seconds), hemisphere))
}

/// Reads one signed coordinate from print-converted exif.
///
/// Accepts the DMS string form as well as a plain number (as written by `exiftool -n`).
pub fn get_coordinate(exif: &Value, axis: Axis) -> Option<f64> {
    let raw = exif.get(axis.tag())?;
    let reference_sign = exif
        .get(axis.ref_tag())
        .and_then(Value::as_str)
        .and_then(hemisphere_sign);

    let value = if let Some(number) = raw.as_f64() {
        match reference_sign {
            Some(sign) => number.abs() * sign,
            None => number,
        }
    } else {
        let (unsigned, hemisphere) = parse_dms(raw.as_str()?)?;
        let sign = hemisphere
            .and_then(|h| hemisphere_sign(&h.to_string()))
            .or(reference_sign)
            .unwrap_or(1.0);
        unsigned * sign
    };

    (value.is_finite() && value.abs() <= axis.limit()).then_some(value)
}

/// Parses exiftool's altitude, either numeric or like `12.3 m Above Sea Level`.
fn parse_altitude(value: &Value) -> Option<f64> {
    if let Some(number) = value.as_f64() {
        return Some(number);
    }
    let text = value.as_str()?;
    let magnitude: f64 = text.split_whitespace().next()?.parse().ok()?;
    if text.contains("Below") {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

/// Takes the magnitude from the numeric tags, which keep full precision where the printed
/// form rounds seconds to two decimals. The printed form decides the hemisphere.
fn precise_coordinate(exif: &Value, numeric_exif: &Value, axis: Axis) -> Option<f64> {
    match (get_coordinate(numeric_exif, axis), get_coordinate(exif, axis)) {
        (Some(numeric), Some(printed)) => Some(numeric.abs().copysign(printed)),
        (numeric, printed) => numeric.or(printed),
    }
}

/// Extracts the photo position. Both coordinates must be present and well-formed.
pub fn get_coordinates(exif: &Value, numeric_exif: &Value) -> Option<Coordinates> {
    let (Some(latitude), Some(longitude)) = (
        precise_coordinate(exif, numeric_exif, Axis::Latitude),
        precise_coordinate(exif, numeric_exif, Axis::Longitude),
    ) else {
        return None;
    };
    let altitude = numeric_exif
        .get("GPSAltitude")
        .or_else(|| exif.get("GPSAltitude"))
        .and_then(parse_altitude)
        .filter(|a| a.is_finite());

    Some(Coordinates {
        latitude: round_to(latitude, RECORD_PRECISION),
        longitude: round_to(longitude, RECORD_PRECISION),
        altitude,
    })
}

/// Looks up the nearest populated place for a coordinate pair.
pub fn get_location_name(geocoder: &ReverseGeocoder, latitude: f64, longitude: f64) -> LocationName {
    let search_result = geocoder.search((latitude, longitude));
    let record = search_result.record;
    let country_name = rust_iso3166::from_alpha2(&record.cc);
    LocationName {
        name: record.name.clone(),
        admin1: record.admin1.clone(),
        admin2: record.admin2.clone(),
        country_code: record.cc.clone(),
        country_name: country_name.map(|a| a.name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_dms_full() {
        let (value, hemisphere) = parse_dms(r#"40 deg 49' 15.20" N"#).unwrap();
        assert!(close(value, 40.0 + 49.0 / 60.0 + 15.20 / 3600.0));
        assert_eq!(hemisphere, Some('N'));
    }

    #[test]
    fn test_parse_dms_without_hemisphere_or_seconds() {
        let (value, hemisphere) = parse_dms("14 deg 25'").unwrap();
        assert!(close(value, 14.0 + 25.0 / 60.0));
        assert_eq!(hemisphere, None);
    }

    #[test]
    fn test_parse_dms_rejects_out_of_range_minutes() {
        assert!(parse_dms(r#"40 deg 61' 0.00" N"#).is_none());
        assert!(parse_dms(r#"40 deg 10' 60.00" N"#).is_none());
    }

    #[test]
    fn test_parse_dms_rejects_garbage() {
        assert!(parse_dms("not a coordinate").is_none());
        assert!(parse_dms("").is_none());
    }

    #[test]
    fn test_coordinates_match_manual_conversion() {
        let exif = json!({
            "GPSLatitude": "52 deg 22' 45.08\" N",
            "GPSLongitude": "4 deg 53' 57.95\" E",
        });
        let coords = get_coordinates(&exif, &json!({})).unwrap();

        let expected_lat = round_to(52.0 + 22.0 / 60.0 + 45.08 / 3600.0, RECORD_PRECISION);
        let expected_lon = round_to(4.0 + 53.0 / 60.0 + 57.95 / 3600.0, RECORD_PRECISION);
        assert_eq!(coords.latitude, expected_lat);
        assert_eq!(coords.longitude, expected_lon);
        assert!(coords.altitude.is_none());
    }

    #[test]
    fn test_southern_and_western_hemispheres_are_negative() {
        let exif = json!({
            "GPSLatitude": "33 deg 52' 4.00\" S",
            "GPSLongitude": "151 deg 12' 36.00\"",
            "GPSLongitudeRef": "West",
        });
        let coords = get_coordinates(&exif, &json!({})).unwrap();
        assert!(coords.latitude < 0.0);
        assert!(coords.longitude < 0.0);
        assert_eq!(coords.longitude, -round_to(151.21, RECORD_PRECISION));
    }

    #[test]
    fn test_numeric_coordinates_are_accepted() {
        let exif = json!({
            "GPSLatitude": 40.7128,
            "GPSLongitude": -74.0060,
        });
        let numeric = json!({ "GPSAltitude": 10.5 });
        let coords = get_coordinates(&exif, &numeric).unwrap();
        assert_eq!(coords.latitude, 40.7128);
        assert_eq!(coords.longitude, -74.006);
        assert_eq!(coords.altitude, Some(10.5));
    }

    #[test]
    fn test_numeric_tags_keep_full_precision() {
        let exif = json!({
            "GPSLatitude": "40 deg 49' 15.20\" N",
            "GPSLongitude": "73 deg 57' 0.00\" W",
        });
        let numeric = json!({
            "GPSLatitude": 40.8208881,
            "GPSLatitudeRef": "N",
            "GPSLongitude": 73.95,
        });
        let coords = get_coordinates(&exif, &numeric).unwrap();
        assert_eq!(coords.latitude, 40.820888);
        // The printed hemisphere applies when the numeric tag is unsigned.
        assert_eq!(coords.longitude, -73.95);
    }

    #[test]
    fn test_malformed_numeric_tag_falls_back_to_printed() {
        let exif = json!({
            "GPSLatitude": "52 deg 22' 45.08\" N",
            "GPSLongitude": "4 deg 53' 57.95\" E",
        });
        let numeric = json!({ "GPSLatitude": "garbage", "GPSLongitude": 4.899431 });
        let coords = get_coordinates(&exif, &numeric).unwrap();
        assert_eq!(
            coords.latitude,
            round_to(dms_to_decimal(52.0, 22.0, 45.08), RECORD_PRECISION)
        );
        assert_eq!(coords.longitude, 4.899431);
    }

    #[test]
    fn test_altitude_print_form() {
        let exif = json!({
            "GPSLatitude": 1.0,
            "GPSLongitude": 1.0,
            "GPSAltitude": "3.5 m Below Sea Level",
        });
        let coords = get_coordinates(&exif, &json!({})).unwrap();
        assert_eq!(coords.altitude, Some(-3.5));
    }

    #[test]
    fn test_returns_none_if_latitude_is_missing() {
        let exif = json!({ "GPSLongitude": "4 deg 53' 57.95\" E" });
        assert!(get_coordinates(&exif, &json!({})).is_none());
    }

    #[test]
    fn test_returns_none_if_longitude_is_malformed() {
        let exif = json!({
            "GPSLatitude": "52 deg 22' 45.08\" N",
            "GPSLongitude": "somewhere",
        });
        assert!(get_coordinates(&exif, &json!({})).is_none());
    }

    #[test]
    fn test_returns_none_if_latitude_out_of_range() {
        let exif = json!({
            "GPSLatitude": 95.0,
            "GPSLongitude": 4.0,
        });
        assert!(get_coordinates(&exif, &json!({})).is_none());
    }

    #[test]
    fn test_location_display_skips_empty_parts() {
        let location = LocationName {
            name: "Amsterdam".to_string(),
            admin1: String::new(),
            admin2: String::new(),
            country_code: "NL".to_string(),
            country_name: None,
        };
        assert_eq!(location.display(), "Amsterdam, NL");
    }

    #[test]
    fn test_get_location_name() {
        let geocoder = ReverseGeocoder::new();
        let location = get_location_name(&geocoder, 52.379_189, 4.899_431);
        assert_eq!(location.name, "Amsterdam");
        assert_eq!(location.country_code, "NL");
        assert_eq!(location.country_name, Some("Netherlands".to_string()));
    }
}
