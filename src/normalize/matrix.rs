//! Dense year × day-of-year lookup tables.

use crate::normalize::date_index::DAYS_PER_YEAR;
use crate::normalize::record::{NormalizedRecord, Variable};
use ordered_float::OrderedFloat;
use std::ops::RangeInclusive;

/// A record value together with the year it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayExtreme {
    pub year: i32,
    pub value: f64,
}

/// A dense (doy 1..=365) × (year span) table of optional values for a single
/// variable.
///
/// Absent cells are genuinely missing observations, distinct from any numeric
/// value. The year span runs from the earliest to the latest year observed
/// for the variable; years inside the span with no records at all appear as
/// columns of entirely missing cells. Matrices built independently for
/// different variables may therefore cover different spans.
///
/// Duplicate policy: when two records target the same (doy, year) cell, the
/// one encountered first in input order wins and later ones are silently
/// ignored. This matches the historical output files and is deliberate; do
/// not change it to averaging.
///
/// # Examples
///
/// ```
/// use climatrend::{Normalizer, NormalizeConfig, RawObservation, Variable, YearMatrix};
///
/// let raw = vec![
///     RawObservation { date: "2020-01-01".into(), variable: Variable::Tmax, value: 100.0, station: None },
///     RawObservation { date: "2020-01-01".into(), variable: Variable::Tmax, value: 990.0, station: None },
/// ];
/// let table = Normalizer::new(NormalizeConfig::default()).normalize(raw);
/// let matrix = YearMatrix::build(Variable::Tmax, table.records());
///
/// // First write wins on the duplicated cell.
/// assert_eq!(matrix.get(1, 2020), Some(50.0));
/// assert_eq!(matrix.missing_cells(), 364);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct YearMatrix {
    variable: Variable,
    first_year: i32,
    num_years: usize,
    /// Column-major: all 365 slots of a year are contiguous.
    cells: Vec<Option<f64>>,
    missing: usize,
}

impl YearMatrix {
    /// Builds the matrix for `variable` from a record slice, using the span
    /// of years that variable was observed in.
    pub fn build(variable: Variable, records: &[NormalizedRecord]) -> YearMatrix {
        let span = records
            .iter()
            .filter(|r| r.variable == variable)
            .fold(None::<(i32, i32)>, |span, r| match span {
                None => Some((r.year, r.year)),
                Some((lo, hi)) => Some((lo.min(r.year), hi.max(r.year))),
            });
        match span {
            Some((lo, hi)) => Self::build_for_span(variable, records, lo..=hi),
            None => YearMatrix {
                variable,
                first_year: 0,
                num_years: 0,
                cells: Vec::new(),
                missing: 0,
            },
        }
    }

    /// Builds the matrix over an explicit year span, for callers that want a
    /// shared axis across variables. Records outside the span are ignored.
    pub fn build_for_span(
        variable: Variable,
        records: &[NormalizedRecord],
        years: RangeInclusive<i32>,
    ) -> YearMatrix {
        let first_year = *years.start();
        let num_years = if years.is_empty() {
            0
        } else {
            (*years.end() - first_year) as usize + 1
        };
        let mut cells = vec![None; num_years * DAYS_PER_YEAR];
        for record in records.iter().filter(|r| r.variable == variable) {
            if record.year < first_year || record.year > *years.end() {
                continue;
            }
            let index =
                (record.year - first_year) as usize * DAYS_PER_YEAR + (record.doy as usize - 1);
            // First write wins; later duplicates for the cell are dropped.
            if cells[index].is_none() {
                cells[index] = Some(record.value);
            }
        }
        let missing = cells.iter().filter(|c| c.is_none()).count();
        YearMatrix {
            variable,
            first_year,
            num_years,
            cells,
            missing,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Number of year columns.
    pub fn num_years(&self) -> usize {
        self.num_years
    }

    pub fn is_empty(&self) -> bool {
        self.num_years == 0
    }

    pub fn first_year(&self) -> Option<i32> {
        (self.num_years > 0).then_some(self.first_year)
    }

    pub fn last_year(&self) -> Option<i32> {
        (self.num_years > 0).then_some(self.first_year + self.num_years as i32 - 1)
    }

    /// The year columns, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.num_years).map(|i| self.first_year + i as i32)
    }

    /// Cell lookup. `None` for missing observations and out-of-range keys.
    pub fn get(&self, doy: u16, year: i32) -> Option<f64> {
        if !(1..=DAYS_PER_YEAR as u16).contains(&doy) {
            return None;
        }
        let offset = i64::from(year) - i64::from(self.first_year);
        if offset < 0 || offset as usize >= self.num_years {
            return None;
        }
        self.cells[offset as usize * DAYS_PER_YEAR + doy as usize - 1]
    }

    /// Count of cells with no observation, fixed at construction.
    pub fn missing_cells(&self) -> usize {
        self.missing
    }

    /// Iterates (year, 365-slot column) pairs, ascending by year.
    pub fn columns(&self) -> impl Iterator<Item = (i32, &[Option<f64>])> {
        self.cells
            .chunks(DAYS_PER_YEAR)
            .enumerate()
            .map(|(i, column)| (self.first_year + i as i32, column))
    }

    /// One day-of-year slot across every year, ascending by year.
    pub fn across_years(&self, doy: u16) -> impl Iterator<Item = (i32, Option<f64>)> + '_ {
        let count = if (1..=DAYS_PER_YEAR as u16).contains(&doy) {
            self.num_years
        } else {
            0
        };
        (0..count).map(move |i| {
            (
                self.first_year + i as i32,
                self.cells[i * DAYS_PER_YEAR + doy as usize - 1],
            )
        })
    }

    /// Highest observed value for a day-of-year slot across all years.
    /// Ties resolve to the earliest year.
    pub fn record_high(&self, doy: u16) -> Option<DayExtreme> {
        self.extreme(doy, |candidate, best| {
            OrderedFloat(candidate) > OrderedFloat(best)
        })
    }

    /// Lowest observed value for a day-of-year slot across all years.
    /// Ties resolve to the earliest year.
    pub fn record_low(&self, doy: u16) -> Option<DayExtreme> {
        self.extreme(doy, |candidate, best| {
            OrderedFloat(candidate) < OrderedFloat(best)
        })
    }

    fn extreme(&self, doy: u16, beats: impl Fn(f64, f64) -> bool) -> Option<DayExtreme> {
        let mut best: Option<DayExtreme> = None;
        for (year, value) in self.across_years(doy) {
            if let Some(value) = value {
                let take = match &best {
                    None => true,
                    Some(current) => beats(value, current.value),
                };
                if take {
                    best = Some(DayExtreme { year, value });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn record(date: &str, variable: Variable, doy: u16, value: f64) -> NormalizedRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        NormalizedRecord {
            date,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            doy,
            variable,
            value,
        }
    }

    #[test]
    fn first_write_wins_on_duplicate_cells() {
        let records = vec![
            record("2020-01-01", Variable::Tmax, 1, 50.0),
            record("2020-01-01", Variable::Tmax, 1, 99.0),
        ];
        let matrix = YearMatrix::build(Variable::Tmax, &records);
        assert_eq!(matrix.get(1, 2020), Some(50.0));
    }

    #[test]
    fn span_covers_gap_years_as_all_missing_columns() {
        let records = vec![
            record("2018-01-01", Variable::Tmax, 1, 60.0),
            record("2020-01-01", Variable::Tmax, 1, 65.0),
        ];
        let matrix = YearMatrix::build(Variable::Tmax, &records);
        assert_eq!(matrix.first_year(), Some(2018));
        assert_eq!(matrix.last_year(), Some(2020));
        assert_eq!(matrix.num_years(), 3);
        // 2019 exists as a column with every cell missing.
        assert!(matrix.across_years(1).any(|(y, v)| y == 2019 && v.is_none()));
        assert_eq!(matrix.missing_cells(), 3 * 365 - 2);
    }

    #[test]
    fn only_the_requested_variable_lands_in_the_matrix() {
        let records = vec![
            record("2020-01-01", Variable::Tmax, 1, 60.0),
            record("2021-01-01", Variable::Tmin, 1, 30.0),
        ];
        let matrix = YearMatrix::build(Variable::Tmax, &records);
        assert_eq!(matrix.num_years(), 1);
        assert_eq!(matrix.get(1, 2021), None);

        // Built independently, the TMIN matrix has its own span.
        let tmin = YearMatrix::build(Variable::Tmin, &records);
        assert_eq!(tmin.first_year(), Some(2021));
    }

    #[test]
    fn empty_input_yields_an_empty_matrix() {
        let matrix = YearMatrix::build(Variable::Tmax, &[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.get(1, 2020), None);
        assert_eq!(matrix.missing_cells(), 0);
        assert_eq!(matrix.years().count(), 0);
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let records = vec![record("2020-06-01", Variable::Tmax, 153, 80.0)];
        let matrix = YearMatrix::build(Variable::Tmax, &records);
        assert_eq!(matrix.get(0, 2020), None);
        assert_eq!(matrix.get(366, 2020), None);
        assert_eq!(matrix.get(153, 1919), None);
        assert_eq!(matrix.get(153, 2020), Some(80.0));
    }

    #[test]
    fn extremes_pick_earliest_year_on_ties() {
        let records = vec![
            record("2018-01-01", Variable::Tmax, 1, 70.0),
            record("2019-01-01", Variable::Tmax, 1, 70.0),
            record("2020-01-01", Variable::Tmax, 1, 55.0),
        ];
        let matrix = YearMatrix::build(Variable::Tmax, &records);
        let high = matrix.record_high(1).unwrap();
        assert_eq!((high.year, high.value), (2018, 70.0));
        let low = matrix.record_low(1).unwrap();
        assert_eq!((low.year, low.value), (2020, 55.0));
        assert_eq!(matrix.record_high(2), None);
    }

    #[test]
    fn explicit_span_ignores_outside_records() {
        let records = vec![
            record("2018-01-01", Variable::Tmax, 1, 60.0),
            record("2020-01-01", Variable::Tmax, 1, 65.0),
        ];
        let matrix = YearMatrix::build_for_span(Variable::Tmax, &records, 2019..=2020);
        assert_eq!(matrix.num_years(), 2);
        assert_eq!(matrix.get(1, 2018), None);
        assert_eq!(matrix.get(1, 2020), Some(65.0));
    }
}
