use crate::features::error::WeatherError;
use crate::features::hashing::hash_key;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(3600);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    url: String,
    body: String,
}

/// On-disk cache of weather responses, one file per request URL.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    expire_after: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, expire_after: Duration) -> Self {
        Self {
            dir: dir.into(),
            expire_after,
        }
    }

    /// `<user cache dir>/photo_weather`, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("photo_weather"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash_key(url)))
    }

    /// The cached body for `url`, unless missing, unreadable or expired.
    pub fn get(&self, url: &str) -> Option<String> {
        let path = self.entry_path(url);
        let content = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt cache entry");
                return None;
            }
        };
        // Guards against hash collisions, however unlikely.
        if entry.url != url {
            return None;
        }
        let max_age = TimeDelta::from_std(self.expire_after).unwrap_or(TimeDelta::MAX);
        if Utc::now() - entry.stored_at >= max_age {
            tracing::debug!(url, "Cache entry expired");
            return None;
        }
        tracing::debug!(url, "Serving weather response from cache");
        Some(entry.body)
    }

    /// Stores `body` for `url`, replacing any earlier entry.
    ///
    /// # Errors
    ///
    /// Fails if the cache directory or file cannot be written.
    pub fn put(&self, url: &str, body: &str) -> Result<(), WeatherError> {
        fs::create_dir_all(&self.dir).map_err(|e| WeatherError::Cache(e.to_string()))?;
        let entry = CacheEntry {
            stored_at: Utc::now(),
            url: url.to_string(),
            body: body.to_string(),
        };
        let json = serde_json::to_string(&entry).map_err(|e| WeatherError::Cache(e.to_string()))?;
        fs::write(self.entry_path(url), json).map_err(|e| WeatherError::Cache(e.to_string()))
    }
}
