//! Yearly aggregates derived from the normalized tables and daily summaries.

pub mod feels_like;
pub mod heat_days;
pub mod humidity_wind;
pub mod trend;

/// Hot-day threshold in degrees Fahrenheit.
pub const HOT_DAY_F: f64 = 90.0;
/// Extreme-heat-day threshold in degrees Fahrenheit.
pub const EXTREME_DAY_F: f64 = 100.0;
/// Freezing threshold in degrees Fahrenheit, for feels-like cold days.
pub const FREEZING_F: f64 = 32.0;

/// Whether a month falls in the school year (August through June; July is the
/// only month out).
pub fn is_school_month(month: u32) -> bool {
    matches!(month, 1..=6 | 8..=12)
}

/// Mean over the present values of an optional series; `None` when every
/// value is absent.
pub(crate) fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values.flatten() {
        sum += value;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn july_is_the_only_non_school_month() {
        for month in 1..=12u32 {
            assert_eq!(is_school_month(month), month != 7, "month {month}");
        }
    }

    #[test]
    fn mean_skips_missing_values() {
        let values = [Some(1.0), None, Some(3.0)];
        assert_eq!(mean_present(values.into_iter()), Some(2.0));
        assert_eq!(mean_present([None, None].into_iter()), None);
        assert_eq!(mean_present(std::iter::empty()), None);
    }
}
