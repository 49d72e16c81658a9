//! Hourly observation fetch from the Iowa Environmental Mesonet ASOS archive.

use crate::observations::error::ObservationError;
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

const API_URL: &str = "https://mesonet.agron.iastate.edu/cgi-bin/request/asos.py";
/// Fields requested per hour: temperature, dew point, relative humidity,
/// wind speed, gusts, and the precomputed feels-like index.
const HOURLY_FIELDS: &[&str] = &["tmpf", "dwpf", "relh", "sknt", "gust", "feel"];
/// Pause between archive requests; the IEM service is shared and unmetered.
const REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Client for the ASOS hourly archive.
///
/// Fetches month-sized CSV chunks, concatenates them, and caches the combined
/// frame as parquet keyed by station and year span. Subsequent calls for the
/// same span are served from the cache.
pub struct AsosHourlyClient {
    http: Client,
    cache_dir: PathBuf,
}

impl AsosHourlyClient {
    pub fn new(http: Client, cache_dir: &Path) -> Self {
        Self {
            http,
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the hourly observations for `station` over the given years as
    /// a `LazyFrame` with columns `station`, `valid`, and the requested
    /// hourly fields.
    pub async fn fetch_hourly(
        &self,
        station: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<LazyFrame, ObservationError> {
        let cache_path = self
            .cache_dir
            .join(format!("asos-{station}-{start_year}-{end_year}.parquet"));

        if fs::metadata(&cache_path).await.is_ok() {
            info!(
                "cache hit for hourly data for station {} at {:?}",
                station, cache_path
            );
        } else {
            warn!(
                "cache miss for hourly data for station {}. Downloading {}..={}",
                station, start_year, end_year
            );
            let combined = self.download_all(station, start_year, end_year).await?;
            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(|e| ObservationError::CacheDirCreation(self.cache_dir.clone(), e))?;
            Self::cache_dataframe(combined, &cache_path).await?;
            info!(
                "cached hourly data for station {} to {:?}",
                station, cache_path
            );
        }

        LazyFrame::scan_parquet(&cache_path, Default::default())
            .map_err(|e| ObservationError::ParquetScan(cache_path.clone(), e))
    }

    async fn download_all(
        &self,
        station: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<DataFrame, ObservationError> {
        let mut combined: Option<DataFrame> = None;
        let mut chunk_start = first_of_month(start_year, 1);
        let stop = first_of_month(end_year + 1, 1);

        while chunk_start < stop {
            let chunk_end = next_month(chunk_start);
            tokio::time::sleep(REQUEST_DELAY).await;

            let bytes = self.download_chunk(station, chunk_start, chunk_end).await?;
            // Header-only or empty responses mean no observations that month.
            if bytes.iter().filter(|&&b| b == b'\n').count() > 1 {
                let frame = Self::csv_to_dataframe(bytes, station).await?;
                combined = Some(match combined {
                    None => frame,
                    Some(mut acc) => {
                        acc.vstack_mut(&frame)?;
                        acc
                    }
                });
            }
            chunk_start = chunk_end;
        }

        combined.ok_or_else(|| ObservationError::NoData {
            station: station.to_string(),
        })
    }

    /// Downloads one month of CSV, streaming the body into memory.
    async fn download_chunk(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<u8>, ObservationError> {
        let start_param = format!("{}T00:00+00:00", start.format("%Y-%m-%d"));
        let end_param = format!("{}T00:00+00:00", end.format("%Y-%m-%d"));
        let mut query: Vec<(&str, &str)> = vec![
            ("station", station),
            ("sts", &start_param),
            ("ets", &end_param),
            ("tz", "UTC"),
            ("format", "onlycomma"),
            ("missing", "null"),
        ];
        for field in HOURLY_FIELDS {
            query.push(("data", *field));
        }

        let response = self
            .http
            .get(API_URL)
            .query(&query)
            .send()
            .await
            .map_err(|e| ObservationError::NetworkRequest(API_URL.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {} chunk {}: {:?}", API_URL, start, e);
                return Err(if let Some(status) = e.status() {
                    ObservationError::HttpStatus {
                        url: API_URL.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ObservationError::NetworkRequest(API_URL.to_string(), e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        Ok(body)
    }

    /// Parses raw CSV bytes (with header) into a DataFrame on a blocking task.
    async fn csv_to_dataframe(
        bytes: Vec<u8>,
        station: &str,
    ) -> Result<DataFrame, ObservationError> {
        let station_owned = station.to_string();
        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new().map_err(|e| ObservationError::CsvReadIo {
                station: station_owned.clone(),
                source: e,
            })?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| ObservationError::CsvReadIo {
                    station: station_owned.clone(),
                    source: e,
                })?;
            temp_file.flush().map_err(|e| ObservationError::CsvReadIo {
                station: station_owned.clone(),
                source: e,
            })?;

            let df = CsvReadOptions::default()
                .with_has_header(true)
                .map_parse_options(|parse| {
                    parse.with_null_values(Some(NullValues::AllColumnsSingle("null".into())))
                })
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .map_err(|e| ObservationError::CsvReadPolars {
                    station: station_owned.clone(),
                    source: e,
                })?
                .finish()
                .map_err(|e| ObservationError::CsvReadPolars {
                    station: station_owned.clone(),
                    source: e,
                })?;

            for required in ["station", "valid"].iter().chain(HOURLY_FIELDS) {
                if df.column(required).is_err() {
                    return Err(ObservationError::MissingColumn {
                        station: station_owned,
                        column: required.to_string(),
                    });
                }
            }

            // A chunk where a field is entirely absent infers as a null
            // column; pin every hourly field to f64 so chunks stack.
            df.lazy()
                .with_columns(
                    HOURLY_FIELDS
                        .iter()
                        .map(|field| col(*field).cast(DataType::Float64))
                        .collect::<Vec<_>>(),
                )
                .collect()
                .map_err(|e| ObservationError::CsvReadPolars {
                    station: station_owned,
                    source: e,
                })
        })
        .await?
    }

    /// Writes the combined frame to parquet on a blocking task.
    async fn cache_dataframe(mut df: DataFrame, path: &Path) -> Result<(), ObservationError> {
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| ObservationError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| ObservationError::ParquetWritePolars(path_buf, e))?;
            Ok::<(), ObservationError>(())
        })
        .await??;
        Ok(())
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Both arguments are produced by the chunk loop and always in range.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

fn next_month(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    if date.month() == 12 {
        first_of_month(date.year() + 1, 1)
    } else {
        first_of_month(date.year(), date.month() + 1)
    }
}
