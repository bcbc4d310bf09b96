//! Layered settings for the command-line tool.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `~/.config/photo_weather/config.toml`
//! 3. `./photo_weather.toml`
//! 4. A file passed with `--config`
//! 5. `PHOTO_WEATHER_*` environment variables, `__` separating sections
//!    (`PHOTO_WEATHER_WEATHER__WINDOW_DAYS=3` sets `weather.window_days`)
//!
//! Command-line flags are applied on top by the binary.

use crate::features::error::WeatherError;
use crate::report::ReportFormat;
use crate::utils::DEFAULT_EXTENSIONS;
use crate::weather::cache::DEFAULT_EXPIRE_AFTER;
use crate::weather::client::{ARCHIVE_URL, FORECAST_URL};
use crate::weather::{OpenMeteoClient, ResponseCache, RetryPolicy};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "PHOTO_WEATHER_";
pub const LOCAL_CONFIG_FILE: &str = "photo_weather.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanSettings {
    pub recursive: bool,
    pub include_hidden: bool,
    pub extensions: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            recursive: false,
            include_hidden: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub archive_url: String,
    pub forecast_url: String,
    pub window_days: u32,
    pub coordinate_precision: i32,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            archive_url: ARCHIVE_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            window_days: 5,
            coordinate_precision: 2,
            batch_size: 50,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Defaults to the platform cache directory.
    pub dir: Option<PathBuf>,
    pub expire_after_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            expire_after_secs: DEFAULT_EXPIRE_AFTER.as_secs(),
        }
    }
}

impl CacheSettings {
    /// The configured cache, or `None` when disabled or no cache directory is known.
    pub fn build(&self) -> Option<ResponseCache> {
        if !self.enabled {
            return None;
        }
        let dir = self.dir.clone().or_else(ResponseCache::default_dir)?;
        Some(ResponseCache::new(dir, Duration::from_secs(self.expire_after_secs)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// ExifTool executable; looked up on `PATH` when unset.
    #[serde(default)]
    pub exiftool_path: Option<PathBuf>,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

impl Settings {
    /// Loads settings from every source, with `explicit` layered above the standard files.
    ///
    /// # Errors
    ///
    /// Fails if a file cannot be parsed or a value has the wrong type. A missing
    /// `explicit` file is an error too.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(explicit).extract()?)
    }

    /// The provider chain behind [`Settings::load`].
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("photo_weather").join("config.toml"))
    }

    /// Builds the weather client these settings describe.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be initialized.
    pub fn weather_client(&self) -> Result<OpenMeteoClient, WeatherError> {
        let weather = &self.weather;
        OpenMeteoClient::builder()
            .archive_url(weather.archive_url.clone())
            .forecast_url(weather.forecast_url.clone())
            .window_days(weather.window_days)
            .coordinate_precision(weather.coordinate_precision)
            .batch_size(weather.batch_size)
            .timeout(Duration::from_secs(weather.timeout_secs))
            .retry(weather.retry.clone())
            .maybe_cache(self.cache.build())
            .build()
    }
}
