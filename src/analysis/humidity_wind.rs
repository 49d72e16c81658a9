//! Yearly humidity, wind, and dew-point averages from the daily summaries.

use crate::analysis::trend::{series_trend, TrendEstimator, TrendError, TrendLine};
use crate::analysis::mean_present;
use crate::normalize::quality::COMPLETE_YEAR_THRESHOLD;
use crate::observations::daily_summary::DailySummary;
use std::collections::BTreeMap;

/// Inclusive month range treated as summer (June through September).
pub const SUMMER_MONTHS: std::ops::RangeInclusive<u32> = 6..=9;

/// Yearly means of the daily atmosphere statistics. Fields are absent when a
/// year carried no usable values for them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyAtmosphere {
    pub year: i32,
    /// Mean of the daily mean relative humidity (%).
    pub avg_humidity: Option<f64>,
    /// Mean of the daily maximum relative humidity (%).
    pub avg_max_humidity: Option<f64>,
    /// Mean of the daily minimum relative humidity (%).
    pub avg_min_humidity: Option<f64>,
    /// Mean of the daily mean wind speed (knots).
    pub avg_wind_speed: Option<f64>,
    /// Mean of the daily maximum wind speed (knots).
    pub avg_max_wind_speed: Option<f64>,
    /// Mean of the daily mean dew point (°F).
    pub avg_dew_point: Option<f64>,
    /// Same three means restricted to June–September days.
    pub summer_humidity: Option<f64>,
    pub summer_wind_speed: Option<f64>,
    pub summer_dew_point: Option<f64>,
}

/// Averages the daily summaries per year, skipping missing values inside
/// each mean. Years with fewer than 300 summarized days are dropped.
pub fn yearly_atmosphere(days: &[DailySummary]) -> Vec<YearlyAtmosphere> {
    let mut by_year: BTreeMap<i32, Vec<&DailySummary>> = BTreeMap::new();
    for day in days {
        by_year.entry(day.year()).or_default().push(day);
    }

    by_year
        .into_iter()
        .filter(|(_, days)| days.len() >= COMPLETE_YEAR_THRESHOLD)
        .map(|(year, days)| {
            let summer: Vec<&&DailySummary> = days
                .iter()
                .filter(|d| SUMMER_MONTHS.contains(&d.month()))
                .collect();
            YearlyAtmosphere {
                year,
                avg_humidity: mean_present(days.iter().map(|d| d.humidity_mean)),
                avg_max_humidity: mean_present(days.iter().map(|d| d.humidity_max)),
                avg_min_humidity: mean_present(days.iter().map(|d| d.humidity_min)),
                avg_wind_speed: mean_present(days.iter().map(|d| d.wind_mean)),
                avg_max_wind_speed: mean_present(days.iter().map(|d| d.wind_max)),
                avg_dew_point: mean_present(days.iter().map(|d| d.dew_point_mean)),
                summer_humidity: mean_present(summer.iter().map(|d| d.humidity_mean)),
                summer_wind_speed: mean_present(summer.iter().map(|d| d.wind_mean)),
                summer_dew_point: mean_present(summer.iter().map(|d| d.dew_point_mean)),
            }
        })
        .collect()
}

/// Trends over the yearly atmosphere series. Series too short or too sparse
/// to fit come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereTrends {
    pub humidity: Option<TrendLine>,
    pub wind_speed: Option<TrendLine>,
    pub dew_point: Option<TrendLine>,
    pub summer_humidity: Option<TrendLine>,
    pub summer_wind_speed: Option<TrendLine>,
    pub summer_dew_point: Option<TrendLine>,
}

pub fn atmosphere_trends(
    rows: &[YearlyAtmosphere],
    estimator: &dyn TrendEstimator,
) -> Result<AtmosphereTrends, TrendError> {
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let fit = |values: Vec<Option<f64>>| series_trend(&years, &values, estimator);
    Ok(AtmosphereTrends {
        humidity: fit(rows.iter().map(|r| r.avg_humidity).collect())?,
        wind_speed: fit(rows.iter().map(|r| r.avg_wind_speed).collect())?,
        dew_point: fit(rows.iter().map(|r| r.avg_dew_point).collect())?,
        summer_humidity: fit(rows.iter().map(|r| r.summer_humidity).collect())?,
        summer_wind_speed: fit(rows.iter().map(|r| r.summer_wind_speed).collect())?,
        summer_dew_point: fit(rows.iter().map(|r| r.summer_dew_point).collect())?,
    })
}
