use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather service answered with status {0}")]
    Status(StatusCode),

    #[error("Weather service rejected the request ({status}): {reason}")]
    Rejected { status: StatusCode, reason: String },

    #[error("Could not parse weather response: {0}")]
    Parse(String),

    #[error("Response cache error: {0}")]
    Cache(String),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialize report data: {0}")]
    Json(#[from] serde_json::Error),
}
