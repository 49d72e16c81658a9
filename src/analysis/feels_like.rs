//! Extreme feels-like days per year, with raw-temperature counterparts.
//!
//! The feels-like index folds humidity and wind into the temperature, so its
//! extreme-day counts can drift away from the raw-temperature counts. Both
//! are tracked per year for direct comparison.

use crate::analysis::trend::{TrendEstimator, TrendError, TrendLine};
use crate::analysis::{is_school_month, EXTREME_DAY_F, FREEZING_F, HOT_DAY_F};
use crate::normalize::quality::COMPLETE_YEAR_THRESHOLD;
use crate::observations::daily_summary::DailySummary;
use std::collections::BTreeMap;

/// Extreme-day counts for one year. Days with a missing reading never count
/// toward a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeelsLikeDays {
    pub year: i32,
    pub feels_above_90: u32,
    pub feels_above_100: u32,
    pub feels_below_32: u32,
    pub temp_above_90: u32,
    pub temp_above_100: u32,
    pub school_feels_above_90: u32,
    pub school_temp_above_90: u32,
}

/// Counts extreme feels-like and raw-temperature days per year. Years with
/// fewer than 300 summarized days are dropped.
pub fn count_feels_like_days(days: &[DailySummary]) -> Vec<FeelsLikeDays> {
    let mut per_year: BTreeMap<i32, (FeelsLikeDays, usize)> = BTreeMap::new();

    for day in days {
        let (counts, observed) = per_year.entry(day.year()).or_insert_with(|| {
            (
                FeelsLikeDays {
                    year: day.year(),
                    ..FeelsLikeDays::default()
                },
                0,
            )
        });
        *observed += 1;
        let school = is_school_month(day.month());

        let feels_hot = day.feels_max.is_some_and(|v| v >= HOT_DAY_F);
        if feels_hot {
            counts.feels_above_90 += 1;
            if school {
                counts.school_feels_above_90 += 1;
            }
        }
        if day.feels_max.is_some_and(|v| v >= EXTREME_DAY_F) {
            counts.feels_above_100 += 1;
        }
        if day.feels_min.is_some_and(|v| v <= FREEZING_F) {
            counts.feels_below_32 += 1;
        }
        let temp_hot = day.temp_max.is_some_and(|v| v >= HOT_DAY_F);
        if temp_hot {
            counts.temp_above_90 += 1;
            if school {
                counts.school_temp_above_90 += 1;
            }
        }
        if day.temp_max.is_some_and(|v| v >= EXTREME_DAY_F) {
            counts.temp_above_100 += 1;
        }
    }

    per_year
        .into_values()
        .filter(|(_, observed)| *observed >= COMPLETE_YEAR_THRESHOLD)
        .map(|(counts, _)| counts)
        .collect()
}

/// Trends of the feels-like series against the raw-temperature series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeelsLikeTrends {
    pub feels_above_90: TrendLine,
    pub temp_above_90: TrendLine,
    pub feels_below_32: TrendLine,
}

pub fn feels_like_trends(
    counts: &[FeelsLikeDays],
    estimator: &dyn TrendEstimator,
) -> Result<FeelsLikeTrends, TrendError> {
    let years: Vec<f64> = counts.iter().map(|c| f64::from(c.year)).collect();
    let fit = |values: Vec<f64>| estimator.fit(&years, &values);
    Ok(FeelsLikeTrends {
        feels_above_90: fit(counts.iter().map(|c| f64::from(c.feels_above_90)).collect())?,
        temp_above_90: fit(counts.iter().map(|c| f64::from(c.temp_above_90)).collect())?,
        feels_below_32: fit(counts.iter().map(|c| f64::from(c.feels_below_32)).collect())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn year_of_days(year: i32) -> Vec<DailySummary> {
        let mut days = Vec::new();
        let mut date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        while date.year() == year {
            days.push(DailySummary {
                date,
                temp_max: Some(75.0),
                temp_min: Some(55.0),
                temp_mean: Some(65.0),
                dew_point_max: None,
                dew_point_min: None,
                dew_point_mean: None,
                humidity_max: None,
                humidity_min: None,
                humidity_mean: None,
                wind_max: None,
                wind_mean: None,
                gust_max: None,
                feels_max: Some(75.0),
                feels_min: Some(55.0),
                feels_mean: Some(65.0),
            });
            date = date.succ_opt().unwrap();
        }
        days
    }

    #[test]
    fn feels_like_and_raw_counts_diverge() {
        let mut days = year_of_days(2015);
        // Three humid September days: feels-like crosses 90 °F, raw stays under.
        for day in days.iter_mut().filter(|d| d.month() == 9).take(3) {
            day.temp_max = Some(88.0);
            day.feels_max = Some(94.0);
        }
        // One raw-only hot July day.
        for day in days.iter_mut().filter(|d| d.month() == 7).take(1) {
            day.temp_max = Some(91.0);
            day.feels_max = Some(89.0);
        }
        let counts = count_feels_like_days(&days);
        assert_eq!(counts.len(), 1);
        let year = counts[0];
        assert_eq!(year.feels_above_90, 3);
        assert_eq!(year.temp_above_90, 1);
        // September is in the school year, July is not.
        assert_eq!(year.school_feels_above_90, 3);
        assert_eq!(year.school_temp_above_90, 0);
    }

    #[test]
    fn cold_snaps_count_against_the_freezing_threshold() {
        let mut days = year_of_days(2015);
        for day in days.iter_mut().take(4) {
            day.feels_min = Some(30.0);
        }
        days[4].feels_min = Some(32.0); // inclusive boundary
        let counts = count_feels_like_days(&days);
        assert_eq!(counts[0].feels_below_32, 5);
    }

    #[test]
    fn missing_readings_never_count() {
        let mut days = year_of_days(2015);
        for day in &mut days {
            day.feels_max = None;
        }
        let counts = count_feels_like_days(&days);
        assert_eq!(counts[0].feels_above_90, 0);
    }

    #[test]
    fn sparse_years_are_dropped() {
        let mut days = year_of_days(2015);
        days.truncate(250);
        assert!(count_feels_like_days(&days).is_empty());
    }

    #[test]
    fn trend_series_line_up_with_years() {
        use crate::analysis::trend::tests::EndpointSlope;
        let mut days = Vec::new();
        for (year, hot) in [(2010, 2usize), (2011, 4), (2012, 6)] {
            let mut one = year_of_days(year);
            for day in one.iter_mut().filter(|d| d.month() == 9).take(hot) {
                day.feels_max = Some(95.0);
            }
            days.extend(one);
        }
        let counts = count_feels_like_days(&days);
        let trends = feels_like_trends(&counts, &EndpointSlope).unwrap();
        assert!((trends.feels_above_90.slope - 2.0).abs() < 1e-12);
        assert_eq!(trends.temp_above_90.slope, 0.0);
    }
}
