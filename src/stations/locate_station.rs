//! Station discovery against the CDO stations endpoint.

use crate::climatrend::LatLon;
use crate::stations::error::LocateStationError;
use haversine::{distance, Location as HaversineLocation, Units};
use log::info;
use ordered_float::OrderedFloat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

const STATIONS_URL: &str = "https://www.ncdc.noaa.gov/cdo-web/api/v2/stations";
const DATASET_ID: &str = "GHCND";
const QUERY_LIMIT: usize = 1000;
const STATION_CACHE_FILE_NAME: &str = "station_info.json";

/// One GHCN-D station as reported by the CDO stations endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// CDO station identifier, e.g. `GHCND:USC00044715`.
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    /// Earliest date with any data, as reported by the provider.
    #[serde(default)]
    pub mindate: Option<String>,
    /// Latest date with any data, as reported by the provider.
    #[serde(default)]
    pub maxdate: Option<String>,
    #[serde(default)]
    pub datacoverage: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StationsPage {
    #[serde(default)]
    results: Vec<Station>,
}

/// Looks up the observing station for a fixed place of interest.
///
/// Queries one county's GHCN-D stations, filters by name fragments, and when
/// several candidates remain picks the one nearest to a reference point. The
/// chosen station is cached as JSON and returned directly on later runs;
/// delete the cache file to force a fresh search.
pub struct StationLocator {
    http: Client,
    token: String,
    cache_file: PathBuf,
}

impl StationLocator {
    pub fn new(http: Client, token: String, cache_dir: &Path) -> Self {
        Self {
            http,
            token,
            cache_file: cache_dir.join(STATION_CACHE_FILE_NAME),
        }
    }

    /// Finds the station for `county_fips` (e.g. `"06081"`) whose name
    /// contains every fragment in `name_contains` (case-insensitive). With a
    /// reference point, the nearest matching candidate wins; otherwise the
    /// provider's first match does.
    pub async fn find(
        &self,
        county_fips: &str,
        name_contains: &[String],
        near: Option<LatLon>,
    ) -> Result<Station, LocateStationError> {
        if fs::metadata(&self.cache_file).await.is_ok() {
            let bytes = fs::read(&self.cache_file)
                .await
                .map_err(|e| LocateStationError::CacheRead(self.cache_file.clone(), e))?;
            let station: Station = serde_json::from_slice(&bytes)
                .map_err(|e| LocateStationError::CacheDecode(self.cache_file.clone(), e))?;
            info!("using cached station {} ({})", station.name, station.id);
            return Ok(station);
        }

        let candidates = self.fetch_county_stations(county_fips).await?;
        let hints: Vec<String> = name_contains.iter().map(|h| h.to_uppercase()).collect();
        let matching: Vec<Station> = candidates
            .into_iter()
            .filter(|s| {
                let name = s.name.to_uppercase();
                hints.iter().all(|hint| name.contains(hint))
            })
            .collect();

        let chosen = match near {
            Some(point) => matching
                .into_iter()
                .min_by_key(|s| OrderedFloat(distance_km(point, s))),
            None => matching.into_iter().next(),
        };
        let station = chosen.ok_or_else(|| LocateStationError::NoStationFound {
            county: county_fips.to_string(),
            hints: name_contains.to_vec(),
        })?;

        info!(
            "found station {} ({}), coverage {:?} to {:?}",
            station.name, station.id, station.mindate, station.maxdate
        );
        let encoded = serde_json::to_vec_pretty(&station)?;
        fs::write(&self.cache_file, encoded)
            .await
            .map_err(|e| LocateStationError::CacheWrite(self.cache_file.clone(), e))?;
        Ok(station)
    }

    async fn fetch_county_stations(
        &self,
        county_fips: &str,
    ) -> Result<Vec<Station>, LocateStationError> {
        let location_id = format!("FIPS:{county_fips}");
        let limit = QUERY_LIMIT.to_string();
        let query = [
            ("datasetid", DATASET_ID),
            ("locationid", location_id.as_str()),
            ("limit", limit.as_str()),
        ];

        let response = self
            .http
            .get(STATIONS_URL)
            .header("token", self.token.as_str())
            .query(&query)
            .send()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(STATIONS_URL.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    LocateStationError::HttpStatus {
                        url: STATIONS_URL.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    LocateStationError::NetworkRequest(STATIONS_URL.to_string(), e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| LocateStationError::NetworkRequest(STATIONS_URL.to_string(), e))?;
        let page: StationsPage = serde_json::from_str(&body)?;
        Ok(page.results)
    }
}

fn distance_km(point: LatLon, station: &Station) -> f64 {
    distance(
        HaversineLocation {
            latitude: point.0,
            longitude: point.1,
        },
        HaversineLocation {
            latitude: station.latitude,
            longitude: station.longitude,
        },
        Units::Kilometers,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, name: &str, lat: f64, lon: f64) -> Station {
        Station {
            id: id.to_string(),
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            elevation: None,
            mindate: None,
            maxdate: None,
            datacoverage: None,
        }
    }

    #[test]
    fn decodes_a_stations_page() {
        let body = r#"{
            "metadata": {"resultset": {"offset": 1, "count": 1, "limit": 1000}},
            "results": [{
                "elevation": 9.1,
                "mindate": "1948-07-01",
                "maxdate": "2025-06-30",
                "latitude": 37.4811,
                "name": "REDWOOD CITY, CA US",
                "datacoverage": 0.95,
                "id": "GHCND:USC00047339",
                "elevationUnit": "METERS",
                "longitude": -122.2378
            }]
        }"#;
        let page: StationsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 1);
        let s = &page.results[0];
        assert_eq!(s.id, "GHCND:USC00047339");
        assert_eq!(s.mindate.as_deref(), Some("1948-07-01"));
    }

    #[test]
    fn nearest_candidate_wins() {
        let here = LatLon(37.4848, -122.2281);
        let close = station("GHCND:A", "REDWOOD CITY 1", 37.48, -122.23);
        let far = station("GHCND:B", "REDWOOD CITY 2", 37.90, -122.90);
        let nearest = [far.clone(), close.clone()]
            .into_iter()
            .min_by_key(|s| OrderedFloat(distance_km(here, s)))
            .unwrap();
        assert_eq!(nearest.id, close.id);
    }
}
