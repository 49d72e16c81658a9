//! Paginated daily-record fetch from the NOAA Climate Data Online API.

use crate::normalize::record::{RawObservation, Variable};
use crate::observations::error::ObservationError;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

const DATA_URL: &str = "https://www.ncdc.noaa.gov/cdo-web/api/v2/data";
const DATASET_ID: &str = "GHCND";
const PAGE_LIMIT: usize = 1000;
const PAGES_DIR_NAME: &str = "noaa_pages";

/// One page of the CDO `/data` endpoint. An exhausted query returns an empty
/// object with no `results` key at all.
#[derive(Debug, Deserialize)]
struct CdoPage {
    #[serde(default)]
    results: Vec<RawObservation>,
}

/// Client for the CDO daily endpoint. Requires an API token; every raw page
/// is archived as JSON under the cache directory before decoding.
pub struct NoaaDailyClient {
    http: Client,
    token: String,
    pages_dir: PathBuf,
}

impl NoaaDailyClient {
    pub fn new(http: Client, token: String, cache_dir: &Path) -> Self {
        Self {
            http,
            token,
            pages_dir: cache_dir.join(PAGES_DIR_NAME),
        }
    }

    /// Fetches every daily record for `station` over `[start, end]`,
    /// restricted to `variables`, walking the paginated endpoint until a page
    /// comes back empty.
    ///
    /// Any request or decode failure is an error for the whole fetch: a
    /// silently truncated series would skew every trend computed from it.
    pub async fn fetch_daily(
        &self,
        station: &str,
        variables: &[Variable],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawObservation>, ObservationError> {
        fs::create_dir_all(&self.pages_dir)
            .await
            .map_err(|e| ObservationError::CacheDirCreation(self.pages_dir.clone(), e))?;

        let datatype_ids = variables
            .iter()
            .map(Variable::code)
            .collect::<Vec<_>>()
            .join(",");
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        info!(
            "fetching daily {} records for station {} from {} to {}",
            datatype_ids, station, start, end
        );

        let mut rows: Vec<RawObservation> = Vec::new();
        let mut offset = 1usize;
        loop {
            let body = self
                .fetch_page(station, &datatype_ids, &start, &end, offset)
                .await?;

            let page_path = self.pages_dir.join(format!("page_{offset:06}.json"));
            fs::write(&page_path, &body)
                .await
                .map_err(|e| ObservationError::PageArchiveWrite(page_path, e))?;

            let page: CdoPage =
                serde_json::from_str(&body).map_err(|source| ObservationError::JsonDecode {
                    url: DATA_URL.to_string(),
                    source,
                })?;
            if page.results.is_empty() {
                break;
            }
            rows.extend(page.results);
            offset += PAGE_LIMIT;
        }

        if rows.is_empty() {
            return Err(ObservationError::NoData {
                station: station.to_string(),
            });
        }
        info!("fetched {} daily records for station {}", rows.len(), station);
        Ok(rows)
    }

    async fn fetch_page(
        &self,
        station: &str,
        datatype_ids: &str,
        start: &str,
        end: &str,
        offset: usize,
    ) -> Result<String, ObservationError> {
        let limit = PAGE_LIMIT.to_string();
        let offset_param = offset.to_string();
        let query = [
            ("datasetid", DATASET_ID),
            ("stationid", station),
            ("startdate", start),
            ("enddate", end),
            ("datatypeid", datatype_ids),
            ("limit", limit.as_str()),
            ("offset", offset_param.as_str()),
            ("units", "metric"),
        ];

        let response = self
            .http
            .get(DATA_URL)
            .header("token", self.token.as_str())
            .query(&query)
            .send()
            .await
            .map_err(|e| ObservationError::NetworkRequest(DATA_URL.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error at offset {} for {}: {:?}", offset, DATA_URL, e);
                return Err(if let Some(status) = e.status() {
                    ObservationError::HttpStatus {
                        url: DATA_URL.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ObservationError::NetworkRequest(DATA_URL.to_string(), e)
                });
            }
        };

        response
            .text()
            .await
            .map_err(|e| ObservationError::NetworkRequest(DATA_URL.to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_populated_page() {
        let body = r#"{
            "metadata": {"resultset": {"offset": 1, "count": 2, "limit": 1000}},
            "results": [
                {"date": "1948-07-01T00:00:00", "datatype": "TMAX", "station": "GHCND:USC00044715", "attributes": ",,0,2400", "value": 217},
                {"date": "1948-07-01T00:00:00", "datatype": "TMIN", "station": "GHCND:USC00044715", "attributes": ",,0,2400", "value": 117}
            ]
        }"#;
        let page: CdoPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].variable, Variable::Tmax);
        assert_eq!(page.results[1].value, 117.0);
    }

    #[test]
    fn decodes_an_exhausted_page_as_empty() {
        let page: CdoPage = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }
}
