//! Hourly weather from Open-Meteo, with retry and an on-disk response cache.
pub mod cache;
pub mod client;
pub mod retry;
pub mod series;

pub use cache::ResponseCache;
pub use client::{OpenMeteoClient, WeatherQuery};
pub use retry::RetryPolicy;
pub use series::{CaptureConditions, NO_DATA, WeatherSeries, WeatherVariable};
