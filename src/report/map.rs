use super::script_safe_json;
use crate::features::error::ReportError;
use crate::structs::ReportEntry;
use crate::weather::{NO_DATA, WeatherVariable};
use serde::Serialize;

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Photo locations and weather</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; } .popup { white-space: pre-line; }</style>
</head>
<body>
<div id="map"></div>
<script>
const markers = __MARKERS__;
const map = L.map('map').setView([0, 0], 2);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors'
}).addTo(map);
for (const m of markers) {
    const popup = document.createElement('div');
    popup.className = 'popup';
    popup.textContent = m.popup;
    L.marker([m.lat, m.lon]).addTo(map).bindPopup(popup);
}
if (markers.length > 0) {
    map.fitBounds(markers.map(m => [m.lat, m.lon]), { maxZoom: 12, padding: [30, 30] });
}
</script>
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

fn popup_text(entry: &ReportEntry) -> String {
    let conditions = WeatherVariable::ALL
        .iter()
        .map(|v| match entry.conditions.get(*v) {
            Some(value) => format!("{}: {value} {}", v.label(), v.unit()),
            None => format!("{}: {NO_DATA}", v.label()),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Photo: {}\n{}\n{}",
        entry.photo.path.display(),
        entry.photo.captured_at.datetime_local.format("%Y-%m-%d %H:%M:%S"),
        conditions
    )
}

pub fn markers(entries: &[ReportEntry]) -> Vec<MapMarker> {
    entries
        .iter()
        .map(|entry| MapMarker {
            lat: entry.photo.latitude(),
            lon: entry.photo.longitude(),
            popup: popup_text(entry),
        })
        .collect()
}

/// Renders a standalone Leaflet page with one marker per entry.
///
/// # Errors
///
/// Fails only if the markers cannot be serialized.
pub fn render_map(entries: &[ReportEntry]) -> Result<String, ReportError> {
    let json = serde_json::to_string(&markers(entries))?;
    Ok(MAP_TEMPLATE.replace("__MARKERS__", &script_safe_json(&json)))
}
