use super::cache::ResponseCache;
use super::retry::{RetryDecision, RetryPolicy, is_retryable_status, with_retry};
use super::series::{ApiErrorBody, ApiPayload, WeatherSeries, WeatherVariable};
use crate::features::error::WeatherError;
use crate::features::gps::round_to;
use bon::bon;
use chrono::{Days, NaiveDate, Utc};
use reqwest::{Client, Url};
use std::time::Duration;

pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// The archive lags behind real time by a few days; newer windows go to the forecast API.
pub const ARCHIVE_LAG_DAYS: u64 = 5;

/// One point to look up: a position and the capture date (UTC).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Archive,
    Forecast,
}

/// A query after rounding and window expansion.
#[derive(Debug, Clone, PartialEq)]
struct PreparedQuery {
    index: usize,
    latitude: f64,
    longitude: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// Comma-joins one parameter over a batch, as Open-Meteo expects for multiple locations.
fn join_batch(batch: &[PreparedQuery], f: impl Fn(&PreparedQuery) -> String) -> String {
    batch.iter().map(f).collect::<Vec<_>>().join(",")
}

/// Open-Meteo client returning hourly series around each photo.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    archive_url: String,
    forecast_url: String,
    window_days: u32,
    coordinate_precision: i32,
    batch_size: usize,
    retry: RetryPolicy,
    cache: Option<ResponseCache>,
}

#[bon]
impl OpenMeteoClient {
    /// Constructs an `OpenMeteoClient`.
    ///
    /// # Builder Arguments
    ///
    /// * `archive_url` / `forecast_url` - Endpoints of the historical and forecast APIs.
    /// * `window_days: u32` - (Default: `5`) Days of hourly data before and after the capture date.
    /// * `coordinate_precision: i32` - (Default: `2`) Decimals kept in query coordinates. Fewer
    ///   decimals mean more cache hits for photos taken close together.
    /// * `batch_size: usize` - (Default: `50`) Maximum locations per request.
    /// * `timeout: Duration` - (Default: 30 s) Per-request timeout.
    /// * `retry: RetryPolicy` - Backoff for transient failures.
    /// * `cache: Option<ResponseCache>` - Response cache; `None` disables caching.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be initialized.
    #[builder]
    pub fn new(
        #[builder(default = ARCHIVE_URL.to_string())] archive_url: String,
        #[builder(default = FORECAST_URL.to_string())] forecast_url: String,
        #[builder(default = 5)] window_days: u32,
        #[builder(default = 2)] coordinate_precision: i32,
        #[builder(default = 50)] batch_size: usize,
        #[builder(default = Duration::from_secs(30))] timeout: Duration,
        #[builder(default)] retry: RetryPolicy,
        cache: Option<ResponseCache>,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("photo_weather/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            archive_url,
            forecast_url,
            window_days,
            coordinate_precision,
            batch_size: batch_size.max(1),
            retry,
            cache,
        })
    }
}

impl OpenMeteoClient {
    /// Number of hourly samples every returned series holds.
    pub const fn expected_hours(&self) -> usize {
        (2 * self.window_days as usize + 1) * 24
    }

    /// Which API serves a window ending on `end_date`, given today's date.
    pub fn endpoint_for(end_date: NaiveDate, today: NaiveDate) -> Endpoint {
        match today.checked_sub_days(Days::new(ARCHIVE_LAG_DAYS)) {
            Some(archive_edge) if end_date < archive_edge => Endpoint::Archive,
            _ => Endpoint::Forecast,
        }
    }

    fn base_url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Archive => &self.archive_url,
            Endpoint::Forecast => &self.forecast_url,
        }
    }

    fn prepare(&self, index: usize, query: &WeatherQuery) -> PreparedQuery {
        let window = Days::new(u64::from(self.window_days));
        PreparedQuery {
            index,
            latitude: round_to(query.latitude, self.coordinate_precision),
            longitude: round_to(query.longitude, self.coordinate_precision),
            start_date: query.date.checked_sub_days(window).unwrap_or(query.date),
            end_date: query.date.checked_add_days(window).unwrap_or(query.date),
        }
    }

    fn build_url(&self, endpoint: Endpoint, batch: &[PreparedQuery]) -> Result<Url, WeatherError> {
        let hourly = WeatherVariable::ALL
            .iter()
            .map(|v| v.api_name())
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("latitude", join_batch(batch, |q| q.latitude.to_string())),
            ("longitude", join_batch(batch, |q| q.longitude.to_string())),
            ("start_date", join_batch(batch, |q| q.start_date.format("%Y-%m-%d").to_string())),
            ("end_date", join_batch(batch, |q| q.end_date.format("%Y-%m-%d").to_string())),
            ("hourly", hourly),
            ("timezone", "GMT".to_string()),
        ];
        Url::parse_with_params(self.base_url(endpoint), &params)
            .map_err(|e| WeatherError::Parse(format!("invalid weather url: {e}")))
    }

    /// Fetches hourly weather for every query, in order.
    ///
    /// An entry is `None` when the provider refused to answer for that point, for example
    /// because the date lies outside its coverage.
    ///
    /// # Errors
    ///
    /// Fails when a request keeps failing after all retries, or an answer cannot be parsed.
    pub async fn fetch(
        &self,
        queries: &[WeatherQuery],
    ) -> Result<Vec<Option<WeatherSeries>>, WeatherError> {
        let today = Utc::now().date_naive();
        let mut archive = Vec::new();
        let mut forecast = Vec::new();
        for (index, query) in queries.iter().enumerate() {
            let prepared = self.prepare(index, query);
            match Self::endpoint_for(prepared.end_date, today) {
                Endpoint::Archive => archive.push(prepared),
                Endpoint::Forecast => forecast.push(prepared),
            }
        }

        let mut results = vec![None; queries.len()];
        for (endpoint, prepared) in [(Endpoint::Archive, archive), (Endpoint::Forecast, forecast)] {
            for batch in prepared.chunks(self.batch_size) {
                let series = self.fetch_batch(endpoint, batch).await?;
                for (query, series) in batch.iter().zip(series) {
                    results[query.index] = series;
                }
            }
        }
        Ok(results)
    }

    /// Requests a batch; if the provider rejects it, retries its points one by one.
    async fn fetch_batch(
        &self,
        endpoint: Endpoint,
        batch: &[PreparedQuery],
    ) -> Result<Vec<Option<WeatherSeries>>, WeatherError> {
        match self.request(endpoint, batch).await {
            Ok(series) => Ok(series.into_iter().map(Some).collect()),
            Err(WeatherError::Rejected { status, reason }) if batch.len() > 1 => {
                tracing::warn!(%status, %reason, "Batch rejected, querying points one at a time");
                let mut results = Vec::with_capacity(batch.len());
                for query in batch {
                    results.push(self.fetch_single(endpoint, query).await?);
                }
                Ok(results)
            }
            Err(WeatherError::Rejected { status, reason }) => {
                tracing::warn!(%status, %reason, "No weather data for point");
                Ok(vec![None])
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_single(
        &self,
        endpoint: Endpoint,
        query: &PreparedQuery,
    ) -> Result<Option<WeatherSeries>, WeatherError> {
        match self.request(endpoint, std::slice::from_ref(query)).await {
            Ok(mut series) => Ok(series.pop()),
            Err(WeatherError::Rejected { status, reason }) => {
                tracing::warn!(
                    %status,
                    %reason,
                    latitude = query.latitude,
                    longitude = query.longitude,
                    "No weather data for point"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn request(
        &self,
        endpoint: Endpoint,
        batch: &[PreparedQuery],
    ) -> Result<Vec<WeatherSeries>, WeatherError> {
        let url = self.build_url(endpoint, batch)?;
        let body = match self.cache.as_ref().and_then(|c| c.get(url.as_str())) {
            Some(body) => body,
            None => {
                let body = self.download(&url).await?;
                if let Some(cache) = &self.cache
                    && let Err(e) = cache.put(url.as_str(), &body)
                {
                    tracing::warn!(error = %e, "Could not store weather response in cache");
                }
                body
            }
        };
        self.parse_body(&body, batch.len())
    }

    async fn download(&self, url: &Url) -> Result<String, WeatherError> {
        tracing::debug!(%url, "Requesting weather data");
        let response = with_retry(&self.retry, || self.http.get(url.clone()).send()).await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        // Throttling and timeouts that outlast the retries are failures, not rejections.
        if is_retryable_status(status) == RetryDecision::Retry {
            return Err(WeatherError::Status(status));
        }
        if status.is_client_error() {
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(|_| body.clone(), |e| e.reason);
            return Err(WeatherError::Rejected { status, reason });
        }
        Err(WeatherError::Status(status))
    }

    fn parse_body(&self, body: &str, expected: usize) -> Result<Vec<WeatherSeries>, WeatherError> {
        let payload: ApiPayload =
            serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
        let responses = payload.into_responses();
        if responses.len() != expected {
            return Err(WeatherError::Parse(format!(
                "expected {expected} locations, got {}",
                responses.len()
            )));
        }
        responses
            .into_iter()
            .map(|response| {
                let series = WeatherSeries::from_api(response)?;
                if series.samples.len() != self.expected_hours() {
                    return Err(WeatherError::Parse(format!(
                        "expected {} hourly samples, got {}",
                        self.expected_hours(),
                        series.samples.len()
                    )));
                }
                Ok(series)
            })
            .collect()
    }
}
