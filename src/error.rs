use thiserror::Error;

/// The primary error type for the photo-weather crate.
#[derive(Error, Debug)]
pub enum PhotoWeatherError {
    #[error("Exiftool failed to start or process the file")]
    Exiftool(#[from] exiftool::ExifToolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not list photo folder: {0}")]
    Walk(#[from] walkdir::Error),

    // --- Custom Module Errors ---
    #[error("Weather data retrieval failed: {0}")]
    Weather(#[from] crate::features::error::WeatherError),

    #[error("Report generation failed: {0}")]
    Report(#[from] crate::features::error::ReportError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),
}
