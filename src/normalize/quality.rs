//! Per-year completeness accounting.
//!
//! A station year is only useful for trend work when most of its days are
//! present. The check here counts records per (year, variable) and flags
//! years below the threshold. It annotates only: nothing is removed from the
//! record set, and whether flagged years are excluded downstream is the
//! caller's policy.

use crate::normalize::record::{NormalizedRecord, Variable};
use std::collections::BTreeMap;

/// Minimum records per (year, variable) for a year to count as reliable,
/// out of an expected 365. Kept at the historical value; figures produced
/// from these tables depend on it.
pub const COMPLETE_YEAR_THRESHOLD: usize = 300;

/// Record counts for one year, per tracked variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCompleteness {
    year: i32,
    counts: BTreeMap<Variable, usize>,
}

impl YearCompleteness {
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Records observed for `variable` this year (0 when untracked/absent).
    pub fn count(&self, variable: &Variable) -> usize {
        self.counts.get(variable).copied().unwrap_or(0)
    }

    /// Whether this year meets the threshold for `variable`.
    pub fn is_reliable(&self, variable: &Variable) -> bool {
        self.count(variable) >= COMPLETE_YEAR_THRESHOLD
    }

    /// Whether every tracked variable meets the threshold.
    pub fn is_complete(&self) -> bool {
        self.counts.values().all(|&c| c >= COMPLETE_YEAR_THRESHOLD)
    }

    /// All tracked (variable, count) pairs, in variable order.
    pub fn counts(&self) -> impl Iterator<Item = (&Variable, usize)> {
        self.counts.iter().map(|(v, &c)| (v, c))
    }
}

/// Completeness of every observed year, for a set of tracked variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessReport {
    years: Vec<YearCompleteness>,
}

impl CompletenessReport {
    /// Counts records per (year, variable).
    ///
    /// Years are those appearing anywhere in `records`; every year tracks
    /// every variable in `variables` (defaulting to 0) plus any variable it
    /// actually observed. Passing an empty `variables` list tracks only what
    /// was observed.
    pub fn assess(records: &[NormalizedRecord], variables: &[Variable]) -> Self {
        let mut by_year: BTreeMap<i32, BTreeMap<Variable, usize>> = BTreeMap::new();
        for record in records {
            let counts = by_year.entry(record.year).or_default();
            *counts.entry(record.variable.clone()).or_insert(0) += 1;
        }
        for counts in by_year.values_mut() {
            for variable in variables {
                counts.entry(variable.clone()).or_insert(0);
            }
        }
        let years = by_year
            .into_iter()
            .map(|(year, counts)| YearCompleteness { year, counts })
            .collect();
        Self { years }
    }

    /// Per-year entries, ascending by year.
    pub fn years(&self) -> &[YearCompleteness] {
        &self.years
    }

    pub fn year(&self, year: i32) -> Option<&YearCompleteness> {
        self.years
            .binary_search_by_key(&year, |y| y.year)
            .ok()
            .map(|i| &self.years[i])
    }

    pub fn is_reliable(&self, year: i32, variable: &Variable) -> bool {
        self.year(year)
            .map(|y| y.is_reliable(variable))
            .unwrap_or(false)
    }

    /// Years meeting the threshold for `variable`, ascending.
    pub fn reliable_years(&self, variable: &Variable) -> Vec<i32> {
        self.years
            .iter()
            .filter(|y| y.is_reliable(variable))
            .map(|y| y.year)
            .collect()
    }

    /// Years failing the threshold for at least one tracked variable.
    pub fn incomplete_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|y| !y.is_complete())
            .map(|y| y.year)
            .collect()
    }
}
