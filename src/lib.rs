//! # Photo Weather
//!
//! Find out what the weather was like where and when your photos were taken.
//!
//! This crate scans a folder of photos, reads their GPS position and capture time from the
//! embedded metadata, looks up the hourly weather around each photo and writes a report.
//!
//! ## Key Features
//!
//! - **GPS Location**: Reads coordinates from Exif (degrees, minutes, seconds or decimal) and
//!   finds the nearest place name offline.
//! - **Time Information**: Resolves the capture time to UTC using the Exif offset, or the
//!   timezone at the GPS position.
//! - **Weather Conditions**: Fetches hourly temperature, precipitation, wind speed and
//!   humidity from Open-Meteo, batched, cached on disk and retried with backoff.
//! - **Reports**: A Markdown document with an interactive map, or a `points.json` feed with
//!   charts and a static page that renders it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use photo_weather::PhotoWeather;
//! use photo_weather::report::ReportFormat;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), photo_weather::PhotoWeatherError> {
//!     let mut pipeline = PhotoWeather::builder().build()?;
//!     let artifacts = pipeline
//!         .run(Path::new("photos"), Path::new("report"), ReportFormat::Document)
//!         .await?;
//!
//!     for artifact in artifacts {
//!         println!("{} saved as {}", artifact.kind, artifact.path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod config;
pub mod extractor;
pub mod features;
mod photo_weather;
pub mod report;
pub mod shell;
pub mod structs;
pub mod time;
pub mod utils;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use error::PhotoWeatherError;
pub use extractor::{PhotoExtractor, record_from_exif};
pub use features::error::{ReportError, WeatherError};
pub use photo_weather::{PhotoWeather, build_entries, build_report, weather_queries};
pub use structs::{PhotoRecord, ReportEntry};
