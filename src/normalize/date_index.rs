//! Day-of-year indexing on a fixed 365-slot axis.
//!
//! Long-run daily series are compared across years by aligning every year on
//! the same day-of-year axis. Leap years would make that axis 366 slots wide,
//! so February 29 is excluded entirely and every date after February 28 in a
//! leap year has its ordinal shifted down by one. The result: day 60 is
//! March 1 and day 365 is December 31 in *every* year.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Number of slots on the aligned day-of-year axis.
pub const DAYS_PER_YEAR: usize = 365;

/// An input date that does not name a real Gregorian calendar day.
///
/// Records carrying such dates are rejected and counted by the caller; they
/// never abort processing of the surrounding batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidDateError {
    /// The string could not be read as `YYYY-MM-DD` (an optional `T...` time
    /// suffix is tolerated and ignored).
    #[error("date string '{0}' is not an ISO-8601 calendar date")]
    Unparseable(String),

    /// The components parsed but name no real day (e.g. `2021-02-29`).
    #[error("{year:04}-{month:02}-{day:02} is not a real calendar date")]
    NoSuchDay { year: i32, month: u32, day: u32 },
}

/// Calendar components of a date together with its aligned day-of-year slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayIndex {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Calendar day of month, 1-31.
    pub day: u32,
    /// Aligned day-of-year, 1-365. Identical for the same calendar day in
    /// every year: `doy` 60 is March 1 whether or not the year is a leap year.
    pub doy: u16,
}

/// Result of indexing a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIndex {
    /// A regular day with its position on the 365-slot axis.
    Day(DayIndex),
    /// February 29. Carries no slot; callers count and drop it.
    LeapDay,
}

/// Maps a calendar date onto the aligned 365-slot axis.
///
/// February 29 yields [`DateIndex::LeapDay`]. For any other date the ordinal
/// day within the year is computed by the usual Gregorian rules and then, in
/// leap years, decremented by one for dates past February (months 1 and 2 are
/// never shifted). Pure and deterministic: no state, no timezone.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use climatrend::{index_date, DateIndex};
///
/// // March 1 lands on slot 60 in leap and non-leap years alike.
/// let leap = NaiveDate::from_ymd_opt(2000, 3, 1).unwrap();
/// let common = NaiveDate::from_ymd_opt(2001, 3, 1).unwrap();
/// assert!(matches!(index_date(leap), DateIndex::Day(d) if d.doy == 60));
/// assert!(matches!(index_date(common), DateIndex::Day(d) if d.doy == 60));
///
/// // February 29 is excluded from the axis.
/// let feb29 = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
/// assert_eq!(index_date(feb29), DateIndex::LeapDay);
/// ```
pub fn index_date(date: NaiveDate) -> DateIndex {
    if date.month() == 2 && date.day() == 29 {
        return DateIndex::LeapDay;
    }
    let mut doy = date.ordinal() as u16;
    if date.leap_year() && date.month() > 2 {
        doy -= 1;
    }
    DateIndex::Day(DayIndex {
        year: date.year(),
        month: date.month(),
        day: date.day(),
        doy,
    })
}

/// Parses a provider date string into a `NaiveDate`.
///
/// Accepts `YYYY-MM-DD`; a trailing `T...` time portion (as emitted by the
/// CDO API, e.g. `1948-07-01T00:00:00`) is ignored. Dates are calendar dates,
/// never instants: no timezone is applied or assumed.
pub fn parse_observation_date(raw: &str) -> Result<NaiveDate, InvalidDateError> {
    let date_part = raw.split('T').next().unwrap_or(raw).trim();
    let mut fields = date_part.splitn(3, '-');
    let mut next_num = || {
        fields
            .next()
            .and_then(|f| f.parse::<i64>().ok())
            .ok_or_else(|| InvalidDateError::Unparseable(raw.to_string()))
    };
    let year = next_num()?;
    let month = next_num()?;
    let day = next_num()?;
    if !(1..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(InvalidDateError::Unparseable(raw.to_string()));
    }
    let (year, month, day) = (year as i32, month as u32, day as u32);
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(InvalidDateError::NoSuchDay { year, month, day })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doy_of(year: i32, month: u32, day: u32) -> u16 {
        match index_date(NaiveDate::from_ymd_opt(year, month, day).unwrap()) {
            DateIndex::Day(d) => d.doy,
            DateIndex::LeapDay => panic!("{year}-{month}-{day} indexed as a leap day"),
        }
    }

    #[test]
    fn dec_31_is_365_in_common_years() {
        assert_eq!(doy_of(2001, 12, 31), 365);
        assert_eq!(doy_of(1999, 12, 31), 365);
    }

    #[test]
    fn dec_31_is_365_in_leap_years() {
        // Raw ordinal 366, shifted down to match common years.
        assert_eq!(doy_of(2000, 12, 31), 365);
        assert_eq!(doy_of(2020, 12, 31), 365);
    }

    #[test]
    fn march_1_is_60_in_every_year() {
        for year in 1948..=2025 {
            assert_eq!(doy_of(year, 3, 1), 60, "year {year}");
        }
    }

    #[test]
    fn january_and_february_are_never_shifted() {
        assert_eq!(doy_of(2000, 1, 1), 1);
        assert_eq!(doy_of(2000, 2, 28), 59);
        assert_eq!(doy_of(2001, 2, 28), 59);
    }

    #[test]
    fn feb_29_is_excluded() {
        let feb29 = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
        assert_eq!(index_date(feb29), DateIndex::LeapDay);
    }

    #[test]
    fn every_non_leap_day_lands_in_range() {
        for year in [1999, 2000] {
            let mut date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            while date.year() == year {
                if let DateIndex::Day(d) = index_date(date) {
                    assert!((1..=365).contains(&d.doy), "{date} -> {}", d.doy);
                }
                date = date.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn leap_year_axis_is_dense_and_gapless() {
        // All 366 days of a leap year cover exactly slots 1..=365 plus one
        // excluded leap day.
        let mut seen = [false; 366];
        let mut leap_days = 0;
        let mut date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        while date.year() == 2020 {
            match index_date(date) {
                DateIndex::Day(d) => {
                    assert!(!seen[d.doy as usize], "slot {} hit twice", d.doy);
                    seen[d.doy as usize] = true;
                }
                DateIndex::LeapDay => leap_days += 1,
            }
            date = date.succ_opt().unwrap();
        }
        assert_eq!(leap_days, 1);
        assert!(seen[1..=365].iter().all(|&s| s));
    }

    #[test]
    fn parses_plain_and_timestamped_dates() {
        let expect = NaiveDate::from_ymd_opt(1948, 7, 1).unwrap();
        assert_eq!(parse_observation_date("1948-07-01").unwrap(), expect);
        assert_eq!(parse_observation_date("1948-07-01T00:00:00").unwrap(), expect);
    }

    #[test]
    fn rejects_impossible_calendar_days() {
        assert_eq!(
            parse_observation_date("2021-02-29"),
            Err(InvalidDateError::NoSuchDay {
                year: 2021,
                month: 2,
                day: 29
            })
        );
        assert!(matches!(
            parse_observation_date("2021-04-31"),
            Err(InvalidDateError::NoSuchDay { .. })
        ));
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in ["", "not-a-date", "07/01/1948", "2021-13-01", "2021-00-10"] {
            assert!(
                matches!(parse_observation_date(raw), Err(InvalidDateError::Unparseable(_))),
                "{raw:?} should be unparseable"
            );
        }
    }
}
