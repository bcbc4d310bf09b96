use crate::features::error::ReportError;
use crate::structs::ReportEntry;
use crate::weather::{WeatherSeries, WeatherVariable};
use serde::Serialize;
use serde_json::{Value, json};

pub const INDEX_HTML: &str = include_str!("../../assets/index.html");
pub const SCRIPT_JS: &str = include_str!("../../assets/script.js");

/// One entry of `points.json`. The plots are Plotly figures serialized to strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPoint {
    pub lat: f64,
    pub lon: f64,
    /// Capture date, `YYYY-MM-DD`.
    pub timestamp: String,
    pub point_index: usize,
    pub plot1: String,
    pub plot2: String,
}

struct Trace {
    variable: WeatherVariable,
    color: &'static str,
}

fn trace_json(series: Option<&WeatherSeries>, trace: &Trace) -> Value {
    let (x, y): (Vec<String>, Vec<Option<f64>>) = series
        .filter(|s| s.has(trace.variable))
        .map(|s| {
            let times = s
                .samples
                .iter()
                .map(|sample| sample.time.format("%Y-%m-%d %H:%M").to_string())
                .collect();
            (times, s.values(trace.variable))
        })
        .unwrap_or_default();
    json!({
        "type": "scatter",
        "mode": "lines",
        "name": trace.variable.label(),
        "x": x,
        "y": y,
        "line": { "color": trace.color },
        "hovertemplate": format!(
            "%{{x}}<br>{}: %{{y}} {}<extra></extra>",
            trace.variable.label(),
            trace.variable.unit()
        ),
    })
}

/// A Plotly figure with one line per trace and a dotted marker at the capture time.
fn figure(entry: &ReportEntry, title: &str, traces: &[Trace]) -> Value {
    let captured = entry
        .photo
        .captured_at
        .datetime_utc
        .format("%Y-%m-%d %H:%M")
        .to_string();
    json!({
        "data": traces
            .iter()
            .map(|t| trace_json(entry.weather.as_ref(), t))
            .collect::<Vec<_>>(),
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "Date (UTC)" } },
            "yaxis": { "showticklabels": false },
            "showlegend": false,
            "plot_bgcolor": "white",
            "shapes": [{
                "type": "line",
                "x0": captured,
                "x1": captured,
                "yref": "paper",
                "y0": 0,
                "y1": 1,
                "line": { "dash": "dot", "color": "#888888" },
            }],
        },
    })
}

pub fn feed_points(entries: &[ReportEntry]) -> Vec<FeedPoint> {
    let temperature_and_wind = [
        Trace {
            variable: WeatherVariable::Temperature,
            color: "#b30000",
        },
        Trace {
            variable: WeatherVariable::WindSpeed,
            color: "#00b7c7",
        },
    ];
    let precipitation = [Trace {
        variable: WeatherVariable::Precipitation,
        color: "#1a53ff",
    }];

    entries
        .iter()
        .enumerate()
        .map(|(point_index, entry)| FeedPoint {
            lat: entry.photo.latitude(),
            lon: entry.photo.longitude(),
            timestamp: entry
                .photo
                .captured_at
                .datetime_local
                .format("%Y-%m-%d")
                .to_string(),
            point_index,
            plot1: figure(entry, "Temperature & Wind", &temperature_and_wind).to_string(),
            plot2: figure(entry, "Precipitation", &precipitation).to_string(),
        })
        .collect()
}

/// Serializes the feed consumed by the static page.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn render_points(entries: &[ReportEntry]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(&feed_points(entries))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entry, series};

    #[test]
    fn test_points_match_entries() {
        let entries = vec![entry(1, "a.jpg", Some(10.0)), entry(2, "b.jpg", None)];
        let points = feed_points(&entries);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].point_index, 1);
        assert_eq!(points[0].timestamp, "2023-08-01");
        assert_eq!(points[0].lon, 4.899431);
    }

    #[test]
    fn test_plots_are_plotly_json_strings() {
        let mut with_weather = entry(1, "a.jpg", Some(10.0));
        with_weather.weather = Some(series(3));
        let point = &feed_points(&[with_weather])[0];

        let plot1: Value = serde_json::from_str(&point.plot1).unwrap();
        let plot2: Value = serde_json::from_str(&point.plot2).unwrap();
        assert_eq!(plot1["data"].as_array().unwrap().len(), 2);
        assert_eq!(plot1["data"][0]["name"], "Temperature");
        assert_eq!(plot1["data"][0]["y"].as_array().unwrap().len(), 3);
        assert_eq!(plot2["data"][0]["name"], "Precipitation");
        assert_eq!(plot2["layout"]["title"]["text"], "Precipitation");
    }

    #[test]
    fn test_missing_series_gives_empty_traces() {
        let point = &feed_points(&[entry(1, "a.jpg", None)])[0];
        let plot1: Value = serde_json::from_str(&point.plot1).unwrap();
        assert!(plot1["data"][0]["x"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_render_uses_camel_case_keys() {
        let json = render_points(&[entry(1, "a.jpg", None)]).unwrap();
        assert!(json.contains("\"pointIndex\": 0"));
        assert!(json.contains("\"plot1\""));
    }
}
