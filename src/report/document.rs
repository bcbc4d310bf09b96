use crate::structs::ReportEntry;
use crate::weather::{NO_DATA, WeatherVariable};

const TITLE: &str = "Photo locations and weather";

/// Column order of the weather part of the table.
const TABLE_VARIABLES: [WeatherVariable; 4] = [
    WeatherVariable::Precipitation,
    WeatherVariable::Temperature,
    WeatherVariable::WindSpeed,
    WeatherVariable::RelativeHumidity,
];

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn place(entry: &ReportEntry) -> String {
    entry
        .location
        .as_ref()
        .map_or_else(|| NO_DATA.to_string(), |l| l.display())
}

fn file_name(entry: &ReportEntry) -> String {
    entry.photo.path.file_name().map_or_else(
        || entry.photo.path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

fn daylight(entry: &ReportEntry) -> String {
    entry.sun_info.as_ref().map_or_else(
        || NO_DATA.to_string(),
        |sun| {
            let daytime = if sun.is_daytime { "yes" } else { "no" };
            match (sun.sunrise, sun.sunset) {
                (Some(rise), Some(set)) => format!(
                    "{daytime} (sunrise {} UTC, sunset {} UTC)",
                    rise.format("%H:%M"),
                    set.format("%H:%M")
                ),
                _ if sun.is_daytime => format!("{daytime} (midnight sun)"),
                _ => format!("{daytime} (polar night)"),
            }
        },
    )
}

/// Renders the Markdown document: one table row and one section per photo.
pub fn render_document(entries: &[ReportEntry]) -> String {
    let mut lines = vec![format!("# {TITLE}"), String::new()];

    let mut header = vec![
        "#".to_string(),
        "Latitude, Longitude".to_string(),
        "Date".to_string(),
        "Time".to_string(),
        "Place".to_string(),
    ];
    header.extend(
        TABLE_VARIABLES
            .iter()
            .map(|v| format!("{} ({})", v.label(), v.unit())),
    );
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!("|{}", "---|".repeat(header.len())));

    for entry in entries {
        let local = entry.photo.captured_at.datetime_local;
        let mut row = vec![
            entry.index.to_string(),
            format!("{}, {}", entry.photo.latitude(), entry.photo.longitude()),
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M:%S").to_string(),
            cell(&place(entry)),
        ];
        row.extend(TABLE_VARIABLES.iter().map(|v| entry.conditions.display(*v)));
        lines.push(format!("| {} |", row.join(" | ")));
    }

    if entries.is_empty() {
        lines.push(String::new());
        lines.push("_No photos with a GPS position and capture date were found._".to_string());
    }

    for entry in entries {
        let captured = &entry.photo.captured_at;
        lines.push(String::new());
        lines.push(format!("## {}. {}", entry.index, cell(&file_name(entry))));
        lines.push(String::new());
        lines.push(format!("- Photo: `{}`", entry.photo.path.display()));
        lines.push(format!(
            "- GPS coordinates: latitude {}, longitude {}",
            entry.photo.latitude(),
            entry.photo.longitude()
        ));
        if let Some(altitude) = entry.photo.coordinates.altitude {
            lines.push(format!("- Altitude: {altitude} m"));
        }
        lines.push(format!(
            "- Taken: {} at {} ({}, {} UTC)",
            captured.datetime_local.format("%Y-%m-%d"),
            captured.datetime_local.format("%H:%M:%S"),
            captured.timezone.as_deref().unwrap_or("timezone unknown"),
            captured.datetime_utc.format("%Y-%m-%d %H:%M")
        ));
        lines.push(format!("- Place: {}", place(entry)));
        lines.push(format!("- Daylight: {}", daylight(entry)));
        lines.extend(TABLE_VARIABLES.iter().map(|variable| {
            format!(
                "- {} ({}): {}",
                variable.label(),
                variable.unit(),
                entry.conditions.display(*variable)
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sun::SunInfo;
    use crate::test_support::entry;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_row_per_entry() {
        let entries = vec![entry(1, "a.jpg", Some(21.5)), entry(2, "b.jpg", None)];
        let document = render_document(&entries);

        let rows: Vec<&str> = document
            .lines()
            .filter(|line| line.starts_with("| ") && !line.starts_with("| #"))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("| 1 | 52.379189, 4.899431 | 2023-08-01 | 19:23:45 |"));
        assert!(rows[0].contains("| 21.5 |"));
        assert!(rows[1].contains(NO_DATA));
    }

    #[test]
    fn test_narrative_section() {
        let document = render_document(&[entry(1, "sunset.jpg", Some(21.5))]);
        assert!(document.contains("## 1. sunset.jpg"));
        assert!(document.contains("- Temperature (°C): 21.5"));
        assert!(document.contains("- Humidity (%): no data"));
        assert!(document.contains("Europe/Amsterdam, 2023-08-01 17:23 UTC"));
    }

    #[test]
    fn test_header_and_empty_report() {
        let document = render_document(&[]);
        let mut lines = document.lines();
        assert_eq!(lines.next(), Some("# Photo locations and weather"));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(
            lines.next(),
            Some(
                "| # | Latitude, Longitude | Date | Time | Place | Precipitation (mm) | \
                 Temperature (°C) | Wind speed (km/h) | Humidity (%) |"
            )
        );
        assert!(document.contains("No photos with a GPS position"));
    }

    #[test]
    fn test_section_layout() {
        let document = render_document(&[entry(1, "a.jpg", None)]);
        let section = document
            .split_once("\n\n## 1. a.jpg\n\n")
            .map(|(_, rest)| rest)
            .unwrap();
        assert!(section.starts_with("- Photo: `photos/a.jpg`\n- GPS coordinates:"));
        assert!(section.ends_with("- Humidity (%): no data\n"));
    }

    #[test]
    fn test_daylight_with_and_without_sun_events() {
        let sunrise = Utc.with_ymd_and_hms(2023, 8, 1, 4, 5, 0).unwrap();
        let sunset = Utc.with_ymd_and_hms(2023, 8, 1, 19, 30, 0).unwrap();
        let mut regular = entry(1, "a.jpg", None);
        regular.sun_info = Some(SunInfo {
            sunrise: Some(sunrise),
            sunset: Some(sunset),
            dawn: None,
            dusk: None,
            is_daytime: true,
        });
        assert_eq!(daylight(&regular), "yes (sunrise 04:05 UTC, sunset 19:30 UTC)");

        let mut polar = entry(2, "b.jpg", None);
        polar.sun_info = Some(SunInfo {
            sunrise: None,
            sunset: None,
            dawn: None,
            dusk: None,
            is_daytime: true,
        });
        assert_eq!(daylight(&polar), "yes (midnight sun)");
        polar.sun_info.as_mut().unwrap().is_daytime = false;
        assert_eq!(daylight(&polar), "no (polar night)");
        assert!(render_document(&[polar]).contains("- Daylight: no (polar night)"));
    }

    #[test]
    fn test_pipes_in_file_names_are_escaped() {
        let document = render_document(&[entry(1, "a|b.jpg", None)]);
        assert!(document.contains("## 1. a\\|b.jpg"));
    }
}
