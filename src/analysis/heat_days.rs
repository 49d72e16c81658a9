//! Yearly counts of hot days from the normalized daily-maximum series.

use crate::analysis::trend::{TrendEstimator, TrendError, TrendLine};
use crate::analysis::{is_school_month, EXTREME_DAY_F, HOT_DAY_F};
use crate::normalize::quality::COMPLETE_YEAR_THRESHOLD;
use crate::normalize::record::{NormalizedRecord, Variable};
use std::collections::BTreeMap;

/// Hot-day counts for one year, full-year and school-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeatDays {
    pub year: i32,
    /// Days with a maximum at or above 90 °F.
    pub days_above_90: u32,
    /// Days with a maximum at or above 100 °F.
    pub days_above_100: u32,
    pub school_days_above_90: u32,
    pub school_days_above_100: u32,
}

/// Counts hot days per year over the daily-maximum records.
///
/// Expects values in degrees Fahrenheit (the default pipeline unit). Years
/// with fewer than 300 TMAX records are left out entirely; a sparse year
/// would read as an artificially cool one.
pub fn count_heat_days(records: &[NormalizedRecord]) -> Vec<HeatDays> {
    let mut per_year: BTreeMap<i32, (HeatDays, usize)> = BTreeMap::new();

    for record in records.iter().filter(|r| r.variable == Variable::Tmax) {
        let (counts, observed) = per_year
            .entry(record.year)
            .or_insert_with(|| (HeatDays { year: record.year, ..HeatDays::default() }, 0));
        *observed += 1;
        let school = is_school_month(record.month);
        if record.value >= HOT_DAY_F {
            counts.days_above_90 += 1;
            if school {
                counts.school_days_above_90 += 1;
            }
        }
        if record.value >= EXTREME_DAY_F {
            counts.days_above_100 += 1;
            if school {
                counts.school_days_above_100 += 1;
            }
        }
    }

    per_year
        .into_values()
        .filter(|(_, observed)| *observed >= COMPLETE_YEAR_THRESHOLD)
        .map(|(counts, _)| counts)
        .collect()
}

/// Fitted trends over the yearly hot-day series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatTrends {
    pub above_90: TrendLine,
    pub above_100: TrendLine,
    pub school_above_90: TrendLine,
}

/// Fits the three headline series through the caller's estimator.
pub fn heat_day_trends(
    counts: &[HeatDays],
    estimator: &dyn TrendEstimator,
) -> Result<HeatTrends, TrendError> {
    let years: Vec<f64> = counts.iter().map(|c| f64::from(c.year)).collect();
    let fit = |values: Vec<f64>| estimator.fit(&years, &values);
    Ok(HeatTrends {
        above_90: fit(counts.iter().map(|c| f64::from(c.days_above_90)).collect())?,
        above_100: fit(counts.iter().map(|c| f64::from(c.days_above_100)).collect())?,
        school_above_90: fit(
            counts
                .iter()
                .map(|c| f64::from(c.school_days_above_90))
                .collect(),
        )?,
    })
}
