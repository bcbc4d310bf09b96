use crate::features::error::WeatherError;
use crate::features::gps::round_to;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shown wherever a value is missing from the provider's answer.
pub const NO_DATA: &str = "no data";

/// Hourly variables requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum WeatherVariable {
    #[serde(rename = "temperature_2m")]
    Temperature,
    #[serde(rename = "precipitation")]
    Precipitation,
    #[serde(rename = "wind_speed_10m")]
    WindSpeed,
    #[serde(rename = "relative_humidity_2m")]
    RelativeHumidity,
}

impl WeatherVariable {
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Precipitation,
        Self::WindSpeed,
        Self::RelativeHumidity,
    ];

    /// Name of the variable in the Open-Meteo API.
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature_2m",
            Self::Precipitation => "precipitation",
            Self::WindSpeed => "wind_speed_10m",
            Self::RelativeHumidity => "relative_humidity_2m",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Precipitation => "Precipitation",
            Self::WindSpeed => "Wind speed",
            Self::RelativeHumidity => "Humidity",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Precipitation => "mm",
            Self::WindSpeed => "km/h",
            Self::RelativeHumidity => "%",
        }
    }

    const fn decimals(self) -> i32 {
        match self {
            Self::Temperature => 1,
            _ => 2,
        }
    }

    fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.api_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySample {
    pub time: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub relative_humidity: Option<f64>,
}

impl HourlySample {
    pub const fn get(&self, variable: WeatherVariable) -> Option<f64> {
        match variable {
            WeatherVariable::Temperature => self.temperature,
            WeatherVariable::Precipitation => self.precipitation,
            WeatherVariable::WindSpeed => self.wind_speed,
            WeatherVariable::RelativeHumidity => self.relative_humidity,
        }
    }

    fn slot(&mut self, variable: WeatherVariable) -> &mut Option<f64> {
        match variable {
            WeatherVariable::Temperature => &mut self.temperature,
            WeatherVariable::Precipitation => &mut self.precipitation,
            WeatherVariable::WindSpeed => &mut self.wind_speed,
            WeatherVariable::RelativeHumidity => &mut self.relative_humidity,
        }
    }
}

/// Hourly weather around one photo, in UTC.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSeries {
    /// Grid cell the provider answered for.
    pub latitude: f64,
    pub longitude: f64,
    /// Variables the provider actually returned.
    pub variables: Vec<WeatherVariable>,
    pub samples: Vec<HourlySample>,
}

/// Weather at the capture hour. A `None` field means the provider had no value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConditions {
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub relative_humidity: Option<f64>,
}

impl CaptureConditions {
    pub const fn get(&self, variable: WeatherVariable) -> Option<f64> {
        match variable {
            WeatherVariable::Temperature => self.temperature,
            WeatherVariable::Precipitation => self.precipitation,
            WeatherVariable::WindSpeed => self.wind_speed,
            WeatherVariable::RelativeHumidity => self.relative_humidity,
        }
    }

    /// The value as text, or [`NO_DATA`].
    pub fn display(&self, variable: WeatherVariable) -> String {
        self.get(variable)
            .map_or_else(|| NO_DATA.to_string(), |v| v.to_string())
    }
}

/// One location of an Open-Meteo answer.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub hourly: Option<ApiHourly>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiHourly {
    pub time: Vec<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Vec<Option<f64>>>,
}

/// A single location answers with an object, several with an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiPayload {
    Many(Vec<ApiResponse>),
    One(ApiResponse),
}

impl ApiPayload {
    pub fn into_responses(self) -> Vec<ApiResponse> {
        match self {
            Self::Many(responses) => responses,
            Self::One(response) => vec![response],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub reason: String,
}

fn parse_api_time(value: &str) -> Result<DateTime<Utc>, WeatherError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .map(|dt| dt.and_utc())
        .map_err(|e| WeatherError::Parse(format!("bad time '{value}': {e}")))
}

impl WeatherSeries {
    /// Builds a series from one location of a provider response.
    ///
    /// # Errors
    ///
    /// Fails if a timestamp cannot be parsed or a variable column is not as long as the time
    /// column.
    pub fn from_api(response: ApiResponse) -> Result<Self, WeatherError> {
        let Some(hourly) = response.hourly else {
            return Ok(Self {
                latitude: response.latitude,
                longitude: response.longitude,
                variables: Vec::new(),
                samples: Vec::new(),
            });
        };

        let mut samples = hourly
            .time
            .iter()
            .map(|t| {
                Ok(HourlySample {
                    time: parse_api_time(t)?,
                    temperature: None,
                    precipitation: None,
                    wind_speed: None,
                    relative_humidity: None,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        let mut variables = Vec::new();
        for (name, values) in &hourly.values {
            let Some(variable) = WeatherVariable::from_api_name(name) else {
                continue;
            };
            if values.len() != samples.len() {
                return Err(WeatherError::Parse(format!(
                    "{name} has {} values for {} timestamps",
                    values.len(),
                    samples.len()
                )));
            }
            for (sample, value) in samples.iter_mut().zip(values) {
                *sample.slot(variable) = value.map(|v| round_to(v, variable.decimals()));
            }
            variables.push(variable);
        }
        variables.sort();

        Ok(Self {
            latitude: response.latitude,
            longitude: response.longitude,
            variables,
            samples,
        })
    }

    pub fn has(&self, variable: WeatherVariable) -> bool {
        self.variables.contains(&variable)
    }

    /// The sample for the hour nearest to `at`.
    pub fn sample_at(&self, at: DateTime<Utc>) -> Option<&HourlySample> {
        let rounded = (at.timestamp() + 1800).div_euclid(3600) * 3600;
        self.samples
            .iter()
            .find(|sample| sample.time.timestamp() == rounded)
    }

    pub fn conditions_at(&self, at: DateTime<Utc>) -> CaptureConditions {
        self.sample_at(at)
            .map(|sample| CaptureConditions {
                temperature: sample.temperature,
                precipitation: sample.precipitation,
                wind_speed: sample.wind_speed,
                relative_humidity: sample.relative_humidity,
            })
            .unwrap_or_default()
    }

    pub fn values(&self, variable: WeatherVariable) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.get(variable)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn response(value: serde_json::Value) -> ApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_series_from_api() {
        let series = WeatherSeries::from_api(response(json!({
            "latitude": 52.52,
            "longitude": 13.419998,
            "hourly_units": { "time": "iso8601", "temperature_2m": "°C" },
            "hourly": {
                "time": ["2023-08-01T00:00", "2023-08-01T01:00", "2023-08-01T02:00"],
                "temperature_2m": [17.14, 16.96, null],
                "precipitation": [0.0, 0.123, 0.0],
            }
        })))
        .unwrap();

        assert_eq!(series.samples.len(), 3);
        assert_eq!(
            series.variables,
            vec![WeatherVariable::Temperature, WeatherVariable::Precipitation]
        );
        assert!(!series.has(WeatherVariable::WindSpeed));
        assert_eq!(series.samples[0].temperature, Some(17.1));
        assert_eq!(series.samples[1].precipitation, Some(0.12));
        assert_eq!(series.samples[2].temperature, None);
        assert_eq!(
            series.samples[1].time,
            Utc.with_ymd_and_hms(2023, 8, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_mismatched_column_is_rejected() {
        let result = WeatherSeries::from_api(response(json!({
            "latitude": 1.0,
            "longitude": 1.0,
            "hourly": {
                "time": ["2023-08-01T00:00", "2023-08-01T01:00"],
                "wind_speed_10m": [3.0],
            }
        })));
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }

    #[test]
    fn test_conditions_use_nearest_hour() {
        let series = WeatherSeries::from_api(response(json!({
            "latitude": 1.0,
            "longitude": 1.0,
            "hourly": {
                "time": ["2023-08-01T17:00", "2023-08-01T18:00"],
                "temperature_2m": [20.0, 19.0],
                "wind_speed_10m": [5.5, 6.5],
            }
        })))
        .unwrap();

        let at = Utc.with_ymd_and_hms(2023, 8, 1, 17, 35, 0).unwrap();
        let conditions = series.conditions_at(at);
        assert_eq!(conditions.temperature, Some(19.0));
        assert_eq!(conditions.wind_speed, Some(6.5));
        assert_eq!(conditions.display(WeatherVariable::Precipitation), NO_DATA);
        assert_eq!(conditions.display(WeatherVariable::Temperature), "19");
    }

    #[test]
    fn test_conditions_outside_window_are_empty() {
        let series = WeatherSeries::from_api(response(json!({
            "latitude": 1.0,
            "longitude": 1.0,
            "hourly": { "time": ["2023-08-01T17:00"], "temperature_2m": [20.0] }
        })))
        .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(series.conditions_at(at), CaptureConditions::default());
    }

    #[test]
    fn test_payload_single_and_many() {
        let one: ApiPayload =
            serde_json::from_value(json!({ "latitude": 1.0, "longitude": 2.0 })).unwrap();
        assert_eq!(one.into_responses().len(), 1);

        let many: ApiPayload = serde_json::from_value(json!([
            { "latitude": 1.0, "longitude": 2.0 },
            { "latitude": 3.0, "longitude": 4.0 }
        ]))
        .unwrap();
        assert_eq!(many.into_responses().len(), 2);
    }
}
