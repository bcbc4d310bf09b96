use crate::PhotoWeatherError;
use crate::config::ScanSettings;
use crate::extractor::PhotoExtractor;
use crate::features::error::WeatherError;
use crate::features::gps::get_location_name;
use crate::features::sun::compute_sun_info;
use crate::report::{Artifact, ReportFormat, write_report};
use crate::structs::{PhotoRecord, ReportEntry};
use crate::utils::list_image_files;
use crate::weather::cache::DEFAULT_EXPIRE_AFTER;
use crate::weather::{OpenMeteoClient, ResponseCache, WeatherQuery, WeatherSeries};
use bon::bon;
use reverse_geocoder::ReverseGeocoder;
use std::path::{Path, PathBuf};

/// The whole run: scan a folder, look up the weather, write the report.
///
/// ```rust,no_run
/// # use photo_weather::{PhotoWeather, PhotoWeatherError};
/// # use photo_weather::report::ReportFormat;
/// # use std::path::Path;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), PhotoWeatherError> {
/// let mut pipeline = PhotoWeather::builder().build()?;
/// let artifacts = pipeline
///     .run(Path::new("photos"), Path::new("report"), ReportFormat::All)
///     .await?;
/// for artifact in artifacts {
///     println!("{} saved as {}", artifact.kind, artifact.path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PhotoWeather {
    extractor: PhotoExtractor,
    client: OpenMeteoClient,
    geocoder: ReverseGeocoder,
    scan: ScanSettings,
}

#[bon]
impl PhotoWeather {
    /// Constructs a `PhotoWeather` pipeline.
    ///
    /// # Builder Arguments
    ///
    /// * `exiftool_path: Option<PathBuf>` - A specific `exiftool` executable. If `None`, it is
    ///   searched for on `PATH`.
    /// * `client: Option<OpenMeteoClient>` - The weather client. If `None`, a default client
    ///   caching into the platform cache directory is used.
    /// * `scan: ScanSettings` - Which files of the input folder are read.
    ///
    /// # Errors
    ///
    /// Fails if `exiftool` cannot be started or the default HTTP client cannot be built.
    #[builder]
    pub fn new(
        exiftool_path: Option<PathBuf>,
        client: Option<OpenMeteoClient>,
        #[builder(default)] scan: ScanSettings,
    ) -> Result<Self, PhotoWeatherError> {
        let extractor = PhotoExtractor::new(exiftool_path.as_deref())?;
        let client = match client {
            Some(client) => client,
            None => OpenMeteoClient::builder()
                .maybe_cache(
                    ResponseCache::default_dir().map(|dir| ResponseCache::new(dir, DEFAULT_EXPIRE_AFTER)),
                )
                .build()?,
        };
        Ok(Self {
            extractor,
            client,
            geocoder: ReverseGeocoder::new(),
            scan,
        })
    }

    /// Reads every image in `folder` and keeps the ones with a position and capture time.
    ///
    /// # Errors
    ///
    /// Fails only if the folder cannot be listed. Unreadable images are skipped.
    pub fn collect_photos(&mut self, folder: &Path) -> Result<Vec<PhotoRecord>, PhotoWeatherError> {
        let files = list_image_files(
            folder,
            self.scan.recursive,
            self.scan.include_hidden,
            &self.scan.extensions,
        )?;
        let records: Vec<PhotoRecord> = files
            .iter()
            .filter_map(|file| self.extractor.extract(file))
            .collect();
        tracing::info!(
            files = files.len(),
            geotagged = records.len(),
            "Scanned {}",
            folder.display()
        );
        Ok(records)
    }

    /// Runs the pipeline from `input` to the report in `output`.
    ///
    /// # Errors
    ///
    /// Fails if the input cannot be listed, weather lookups keep failing, or the report
    /// cannot be written.
    pub async fn run(
        &mut self,
        input: &Path,
        output: &Path,
        format: ReportFormat,
    ) -> Result<Vec<Artifact>, PhotoWeatherError> {
        let records = self.collect_photos(input)?;
        let entries = build_report(&self.client, &self.geocoder, records).await?;
        Ok(write_report(&entries, output, format)?)
    }
}

/// One weather query per record, keyed on the UTC capture date.
pub fn weather_queries(records: &[PhotoRecord]) -> Vec<WeatherQuery> {
    records
        .iter()
        .map(|record| WeatherQuery {
            latitude: record.latitude(),
            longitude: record.longitude(),
            date: record.captured_at.datetime_utc.date_naive(),
        })
        .collect()
}

/// Numbers the records 1..n and attaches place, daylight and the weather at capture time.
///
/// `series` must hold one entry per record, in the same order.
pub fn build_entries(
    records: Vec<PhotoRecord>,
    series: Vec<Option<WeatherSeries>>,
    geocoder: &ReverseGeocoder,
) -> Vec<ReportEntry> {
    records
        .into_iter()
        .zip(series)
        .enumerate()
        .map(|(i, (photo, weather))| {
            let at = photo.captured_at.datetime_utc;
            let location = get_location_name(geocoder, photo.latitude(), photo.longitude());
            let sun_info = compute_sun_info(at, photo.latitude(), photo.longitude());
            let conditions = weather
                .as_ref()
                .map(|series| series.conditions_at(at))
                .unwrap_or_default();
            ReportEntry {
                index: i + 1,
                photo,
                location: Some(location),
                sun_info,
                weather,
                conditions,
            }
        })
        .collect()
}

/// Fetches the weather for `records` and turns them into report entries.
///
/// # Errors
///
/// Fails when the weather service keeps failing after all retries.
pub async fn build_report(
    client: &OpenMeteoClient,
    geocoder: &ReverseGeocoder,
    records: Vec<PhotoRecord>,
) -> Result<Vec<ReportEntry>, WeatherError> {
    if records.is_empty() {
        tracing::warn!("No photos with a GPS position and capture date");
        return Ok(Vec::new());
    }
    let series = client.fetch(&weather_queries(&records)).await?;
    let missing = series.iter().filter(|s| s.is_none()).count();
    if missing > 0 {
        tracing::warn!(missing, "Some photos have no weather data");
    }
    Ok(build_entries(records, series, geocoder))
}
