use crate::features::gps::get_coordinates;
use crate::structs::PhotoRecord;
use crate::time::get_capture_time;
use exiftool::ExifTool;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads position and capture time from image files through exiftool.
pub struct PhotoExtractor {
    exiftool: ExifTool,
}

impl PhotoExtractor {
    /// Starts exiftool, from `exiftool_path` or from `PATH`.
    ///
    /// # Errors
    ///
    /// Fails if the executable cannot be found or does not start.
    pub fn new(exiftool_path: Option<&Path>) -> Result<Self, exiftool::ExifToolError> {
        let exiftool = match exiftool_path {
            Some(path) => ExifTool::with_executable(path)?,
            None => ExifTool::new()?,
        };
        Ok(Self { exiftool })
    }

    /// Extracts a [`PhotoRecord`] from an image file.
    ///
    /// Returns `None` if the file cannot be read or lacks a valid position or capture
    /// time. Never fails: unreadable files are just left out.
    pub fn extract(&mut self, path: &Path) -> Option<PhotoRecord> {
        let exif = match self.exiftool.json(path, &[]) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Could not read tags");
                return None;
            }
        };
        let numeric_exif = match self.exiftool.json(path, &["-n"]) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Could not read numeric tags");
                return None;
            }
        };
        let record = record_from_exif(path.to_path_buf(), &exif, &numeric_exif);
        if record.is_none() {
            tracing::debug!(path = %path.display(), "Skipping photo without GPS position or capture date");
        }
        record
    }
}

/// Builds a record from print-converted and numeric exif output.
///
/// Either everything needed is present, or nothing is returned.
pub fn record_from_exif(path: PathBuf, exif: &Value, numeric_exif: &Value) -> Option<PhotoRecord> {
    let coordinates = get_coordinates(exif, numeric_exif)?;
    let captured_at = get_capture_time(
        exif,
        Some((coordinates.latitude, coordinates.longitude)),
    )?;
    let orientation = numeric_exif
        .get("Orientation")
        .and_then(Value::as_u64)
        .filter(|o| (1..=8).contains(o));

    Some(PhotoRecord {
        path,
        coordinates,
        captured_at,
        orientation,
    })
}
