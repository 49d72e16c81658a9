//! The normalization stage: raw provider records in, aligned records out.

use crate::normalize::date_index::{index_date, parse_observation_date, DateIndex, InvalidDateError};
use crate::normalize::record::{NormalizedRecord, RawObservation, TemperatureUnit, Variable};
use log::{info, warn};

/// Configuration for a normalization run.
///
/// Replaces the module-level globals of older scripts: callers decide which
/// variables survive and what unit temperatures land in, nothing is ambient.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    /// Variables to keep. Records for any other variable are skipped before
    /// validation. An empty list keeps everything.
    pub variables: Vec<Variable>,
    /// Target unit for temperature variables.
    pub unit: TemperatureUnit,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            variables: vec![Variable::Tmax, Variable::Tmin],
            unit: TemperatureUnit::Fahrenheit,
        }
    }
}

/// A raw observation that failed date validation, with its reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedObservation {
    pub observation: RawObservation,
    pub reason: InvalidDateError,
}

/// Output of a normalization run.
///
/// Record order follows input order exactly, which downstream duplicate
/// resolution depends on. Re-running over the same input produces an equal
/// table (the whole stage is a pure function of its input).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTable {
    records: Vec<NormalizedRecord>,
    leap_days_removed: usize,
    rejected: Vec<RejectedObservation>,
}

impl NormalizedTable {
    /// The aligned records, in input order.
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// How many February 29 observations were dropped from the axis.
    pub fn leap_days_removed(&self) -> usize {
        self.leap_days_removed
    }

    /// Observations rejected for invalid dates. Rejects never abort the run;
    /// they are collected here for reporting.
    pub fn rejected(&self) -> &[RejectedObservation] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the table, yielding the records.
    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }
}

/// Applies date validation, leap-day removal, day-of-year alignment, and unit
/// conversion to a stream of raw observations.
///
/// # Examples
///
/// ```
/// use climatrend::{Normalizer, NormalizeConfig, RawObservation, Variable};
///
/// let raw = vec![
///     RawObservation { date: "2000-02-29".into(), variable: Variable::Tmax, value: 150.0, station: None },
///     RawObservation { date: "2000-03-01".into(), variable: Variable::Tmax, value: 100.0, station: None },
/// ];
/// let table = Normalizer::new(NormalizeConfig::default()).normalize(raw);
///
/// assert_eq!(table.leap_days_removed(), 1);
/// assert_eq!(table.records().len(), 1);
/// assert_eq!(table.records()[0].doy, 60);
/// assert_eq!(table.records()[0].value, 50.0); // 10.0 °C in °F
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Runs the stage over `raw`, consuming it in order.
    ///
    /// Individual invalid records are collected, not fatal: every remaining
    /// record is still processed.
    pub fn normalize<I>(&self, raw: I) -> NormalizedTable
    where
        I: IntoIterator<Item = RawObservation>,
    {
        let mut table = NormalizedTable::default();
        let mut skipped_variables = 0usize;

        for observation in raw {
            if !self.config.variables.is_empty()
                && !self.config.variables.contains(&observation.variable)
            {
                skipped_variables += 1;
                continue;
            }
            let date = match parse_observation_date(&observation.date) {
                Ok(date) => date,
                Err(reason) => {
                    table.rejected.push(RejectedObservation {
                        observation,
                        reason,
                    });
                    continue;
                }
            };
            match index_date(date) {
                DateIndex::LeapDay => table.leap_days_removed += 1,
                DateIndex::Day(parts) => {
                    let value = if observation.variable.is_temperature() {
                        self.config.unit.from_tenths_celsius(observation.value)
                    } else {
                        observation.value
                    };
                    table.records.push(NormalizedRecord {
                        date,
                        year: parts.year,
                        month: parts.month,
                        day: parts.day,
                        doy: parts.doy,
                        variable: observation.variable,
                        value,
                    });
                }
            }
        }

        info!(
            "normalized {} records ({} leap days removed, {} rejected, {} off-variable)",
            table.records.len(),
            table.leap_days_removed,
            table.rejected.len(),
            skipped_variables
        );
        if !table.rejected.is_empty() {
            warn!(
                "{} observations carried invalid dates and were rejected",
                table.rejected.len()
            );
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(date: &str, variable: Variable, value: f64) -> RawObservation {
        RawObservation {
            date: date.to_string(),
            variable,
            value,
            station: None,
        }
    }

    #[test]
    fn leap_day_produces_no_record_and_is_counted() {
        let table = Normalizer::new(NormalizeConfig::default())
            .normalize(vec![obs("2000-02-29", Variable::Tmax, 150.0)]);
        assert!(table.records().is_empty());
        assert_eq!(table.leap_days_removed(), 1);
        assert!(table.rejected().is_empty());
    }

    #[test]
    fn march_first_aligns_across_leap_and_common_years() {
        let table = Normalizer::new(NormalizeConfig::default()).normalize(vec![
            obs("2001-03-01", Variable::Tmax, 200.0),
            obs("2000-03-01", Variable::Tmax, 100.0),
        ]);
        assert_eq!(table.records().len(), 2);
        assert!(table.records().iter().all(|r| r.doy == 60));
    }

    #[test]
    fn invalid_dates_are_collected_without_aborting() {
        let table = Normalizer::new(NormalizeConfig::default()).normalize(vec![
            obs("2021-02-29", Variable::Tmax, 10.0),
            obs("garbage", Variable::Tmin, 20.0),
            obs("2021-06-01", Variable::Tmax, 250.0),
        ]);
        assert_eq!(table.records().len(), 1);
        assert_eq!(table.rejected().len(), 2);
        assert_eq!(
            table.rejected()[0].reason,
            InvalidDateError::NoSuchDay {
                year: 2021,
                month: 2,
                day: 29
            }
        );
    }

    #[test]
    fn off_variable_records_are_skipped_before_validation() {
        let table = Normalizer::new(NormalizeConfig::default()).normalize(vec![
            obs("totally-broken", Variable::Other("PRCP".into()), 5.0),
            obs("2021-06-01", Variable::Tmax, 250.0),
        ]);
        // The broken PRCP date never reaches the reject pile: it was filtered.
        assert!(table.rejected().is_empty());
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn empty_variable_list_keeps_everything() {
        let config = NormalizeConfig {
            variables: vec![],
            ..NormalizeConfig::default()
        };
        let table = Normalizer::new(config)
            .normalize(vec![obs("2021-06-01", Variable::Other("PRCP".into()), 5.0)]);
        assert_eq!(table.records().len(), 1);
        // Non-temperature values pass through unconverted.
        assert_eq!(table.records()[0].value, 5.0);
    }

    #[test]
    fn temperatures_convert_from_tenths_celsius() {
        let table = Normalizer::new(NormalizeConfig::default())
            .normalize(vec![obs("2021-06-01", Variable::Tmax, 217.0)]);
        let record = &table.records()[0];
        assert!((record.value - 71.06).abs() < 1e-9);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = vec![
            obs("2000-01-01", Variable::Tmax, 100.0),
            obs("2000-02-29", Variable::Tmax, 150.0),
            obs("bad-date", Variable::Tmin, 0.0),
            obs("2000-12-31", Variable::Tmin, -25.0),
        ];
        let normalizer = Normalizer::new(NormalizeConfig::default());
        let first = normalizer.normalize(raw.clone());
        let second = normalizer.normalize(raw);
        assert_eq!(first, second);
    }
}
