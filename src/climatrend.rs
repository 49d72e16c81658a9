//! The main entry point for fetching station history.
//!
//! A [`Climatrend`] client wires the station locator and the two observation
//! providers to a shared cache directory. Fetched pages, the chosen station,
//! and the hourly archive are all cached there, so repeated runs stay cheap.

use crate::error::ClimatrendError;
use crate::normalize::record::{RawObservation, Variable};
use crate::observations::asos::AsosHourlyClient;
use crate::observations::noaa::NoaaDailyClient;
use crate::stations::locate_station::{Station, StationLocator};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::{Datelike, NaiveDate, Utc};
use polars::prelude::LazyFrame;
use reqwest::Client;
use std::path::PathBuf;

/// A geographical coordinate: latitude first, longitude second, both `f64`.
///
/// # Examples
///
/// ```
/// use climatrend::LatLon;
///
/// let redwood_city = LatLon(37.4848, -122.2281);
/// assert_eq!(redwood_city.0, 37.4848); // Latitude
/// assert_eq!(redwood_city.1, -122.2281); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// First year of the hourly airport archive worth fetching by default.
const DEFAULT_HOURLY_START_YEAR: i32 = 1990;

/// Client for fetching station metadata and observation history.
///
/// Create one with [`Climatrend::new`] (default cache directory) or
/// [`Climatrend::with_cache_folder`]. The CDO token is explicit configuration;
/// the library never reads the environment.
///
/// # Examples
///
/// ```rust
/// # use climatrend::{Climatrend, ClimatrendError};
/// # async fn run(token: String) -> Result<(), ClimatrendError> {
/// let client = Climatrend::new(token).await?;
/// // ... locate a station and fetch its history ...
/// # Ok(())
/// # }
/// ```
pub struct Climatrend {
    locator: StationLocator,
    daily: NoaaDailyClient,
    hourly: AsosHourlyClient,
}

#[bon]
impl Climatrend {
    /// Creates a client with an explicit cache directory, creating the
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatrendError::CacheDirCreation`] when the directory cannot
    /// be created or is not a directory.
    pub async fn with_cache_folder(
        noaa_token: impl Into<String>,
        cache_folder: PathBuf,
    ) -> Result<Self, ClimatrendError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| ClimatrendError::CacheDirCreation(cache_folder.clone(), e))?;
        let http = Client::new();
        let token = noaa_token.into();
        Ok(Self {
            locator: StationLocator::new(http.clone(), token.clone(), &cache_folder),
            daily: NoaaDailyClient::new(http.clone(), token, &cache_folder),
            hourly: AsosHourlyClient::new(http, &cache_folder),
        })
    }

    /// Creates a client using the system cache directory (via the `dirs`
    /// crate, e.g. `~/.cache/climatrend_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`ClimatrendError::CacheDirResolution`] when no system cache
    /// directory exists, or [`ClimatrendError::CacheDirCreation`] when it
    /// cannot be created.
    pub async fn new(noaa_token: impl Into<String>) -> Result<Self, ClimatrendError> {
        let cache_folder = get_cache_dir().map_err(ClimatrendError::CacheDirResolution)?;
        Self::with_cache_folder(noaa_token, cache_folder).await
    }

    /// Finds the GHCN-D station for a county, by name fragments and/or
    /// proximity to a point. The result is cached; later calls return it
    /// without touching the network.
    ///
    /// # Arguments
    ///
    /// * `.county_fips(&str)`: **Required.** County FIPS code, e.g. `"06081"`.
    /// * `.name_contains(Vec<String>)`: Optional. Fragments the station name
    ///   must all contain (case-insensitive).
    /// * `.near(LatLon)`: Optional. Prefer the candidate closest to this point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use climatrend::{Climatrend, ClimatrendError, LatLon};
    /// # async fn run(client: Climatrend) -> Result<(), ClimatrendError> {
    /// let station = client
    ///     .find_station()
    ///     .county_fips("06081")
    ///     .name_contains(vec!["REDWOOD".into(), "CITY".into()])
    ///     .near(LatLon(37.4848, -122.2281))
    ///     .call()
    ///     .await?;
    /// println!("using {} ({})", station.name, station.id);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn find_station(
        &self,
        county_fips: &str,
        name_contains: Option<Vec<String>>,
        near: Option<LatLon>,
    ) -> Result<Station, ClimatrendError> {
        self.locator
            .find(county_fips, &name_contains.unwrap_or_default(), near)
            .await
            .map_err(ClimatrendError::from)
    }

    /// Fetches the daily observation history for a station from the CDO API.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: **Required.** CDO station id, e.g.
    ///   `"GHCND:USC00044715"`.
    /// * `.start(NaiveDate)`: **Required.** First day of the range.
    /// * `.end(Option<NaiveDate>)`: Optional. Last day; defaults to today.
    /// * `.variables(Option<Vec<Variable>>)`: Optional. Defaults to TMAX+TMIN.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use climatrend::{Climatrend, ClimatrendError};
    /// # use chrono::NaiveDate;
    /// # async fn run(client: Climatrend) -> Result<(), ClimatrendError> {
    /// let raw = client
    ///     .daily_observations()
    ///     .station("GHCND:USC00044715")
    ///     .start(NaiveDate::from_ymd_opt(1948, 1, 1).unwrap())
    ///     .call()
    ///     .await?;
    /// println!("fetched {} raw records", raw.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn daily_observations(
        &self,
        station: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        variables: Option<Vec<Variable>>,
    ) -> Result<Vec<RawObservation>, ClimatrendError> {
        let end = end.unwrap_or_else(|| Utc::now().date_naive());
        let variables = variables.unwrap_or_else(|| vec![Variable::Tmax, Variable::Tmin]);
        self.daily
            .fetch_daily(station, &variables, start, end)
            .await
            .map_err(ClimatrendError::from)
    }

    /// Fetches the hourly airport archive for a station as a `LazyFrame`,
    /// month by month, cached as parquet after the first run.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: **Required.** ASOS station code, e.g. `"SQL"`.
    /// * `.start_year(Option<i32>)`: Optional. Defaults to 1990.
    /// * `.end_year(Option<i32>)`: Optional. Defaults to the current year.
    #[builder]
    pub async fn hourly_observations(
        &self,
        station: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Result<LazyFrame, ClimatrendError> {
        let start_year = start_year.unwrap_or(DEFAULT_HOURLY_START_YEAR);
        let end_year = end_year.unwrap_or_else(|| Utc::now().year());
        self.hourly
            .fetch_hourly(station, start_year, end_year)
            .await
            .map_err(ClimatrendError::from)
    }
}
