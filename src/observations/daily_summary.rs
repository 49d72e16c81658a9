//! Aggregation of hourly airport observations into per-day statistics.

use crate::observations::error::ObservationError;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Per-day statistics aggregated from hourly observations. Any field can be
/// absent when the underlying hours carried no usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,       // tmpf_max (°F)
    pub temp_min: Option<f64>,       // tmpf_min
    pub temp_mean: Option<f64>,      // tmpf_mean
    pub dew_point_max: Option<f64>,  // dwpf_max (°F)
    pub dew_point_min: Option<f64>,  // dwpf_min
    pub dew_point_mean: Option<f64>, // dwpf_mean
    pub humidity_max: Option<f64>,   // relh_max (%)
    pub humidity_min: Option<f64>,   // relh_min
    pub humidity_mean: Option<f64>,  // relh_mean
    pub wind_max: Option<f64>,       // sknt_max (knots)
    pub wind_mean: Option<f64>,      // sknt_mean
    pub gust_max: Option<f64>,       // gust_max (knots)
    pub feels_max: Option<f64>,      // feel_max (°F)
    pub feels_min: Option<f64>,      // feel_min
    pub feels_mean: Option<f64>,     // feel_mean
}

impl DailySummary {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

/// Collapses an hourly frame (with a `valid` timestamp column and the raw
/// observation fields) into one row per calendar day.
///
/// Max/min/mean are taken per field the way the historical daily tables were
/// built: temperature, dew point, humidity, and feels-like get all three,
/// wind gets max and mean, gusts only max. Nulls are skipped inside each
/// aggregate.
pub fn aggregate_daily(hourly: LazyFrame) -> Result<DataFrame, ObservationError> {
    let parsed = hourly
        .with_column(
            col("valid")
                .str()
                .to_datetime(
                    Some(TimeUnit::Milliseconds),
                    None,
                    StrptimeOptions {
                        format: Some("%Y-%m-%d %H:%M".into()),
                        strict: false,
                        exact: true,
                        cache: true,
                    },
                    lit("raise"),
                )
                .alias("datetime"),
        )
        .with_column(col("datetime").cast(DataType::Date).alias("date"));

    let frame = parsed
        .group_by([col("date")])
        .agg([
            col("tmpf").max().alias("tmpf_max"),
            col("tmpf").min().alias("tmpf_min"),
            col("tmpf").mean().alias("tmpf_mean"),
            col("dwpf").max().alias("dwpf_max"),
            col("dwpf").min().alias("dwpf_min"),
            col("dwpf").mean().alias("dwpf_mean"),
            col("relh").max().alias("relh_max"),
            col("relh").min().alias("relh_min"),
            col("relh").mean().alias("relh_mean"),
            col("sknt").max().alias("sknt_max"),
            col("sknt").mean().alias("sknt_mean"),
            col("gust").max().alias("gust_max"),
            col("feel").max().alias("feel_max"),
            col("feel").min().alias("feel_min"),
            col("feel").mean().alias("feel_mean"),
        ])
        .sort(["date"], Default::default())
        .collect()?;
    Ok(frame)
}

fn opt_float(column: &Column, idx: usize) -> Option<f64> {
    column.f64().ok().and_then(|ca| ca.get(idx))
}

/// Extracts typed rows from an aggregated daily frame.
pub fn daily_summaries(frame: &DataFrame) -> Result<Vec<DailySummary>, ObservationError> {
    let dates = frame.column("date")?.date()?;

    macro_rules! field {
        ($name:expr) => {
            frame.column($name)?
        };
    }
    let tmpf_max = field!("tmpf_max");
    let tmpf_min = field!("tmpf_min");
    let tmpf_mean = field!("tmpf_mean");
    let dwpf_max = field!("dwpf_max");
    let dwpf_min = field!("dwpf_min");
    let dwpf_mean = field!("dwpf_mean");
    let relh_max = field!("relh_max");
    let relh_min = field!("relh_min");
    let relh_mean = field!("relh_mean");
    let sknt_max = field!("sknt_max");
    let sknt_mean = field!("sknt_mean");
    let gust_max = field!("gust_max");
    let feel_max = field!("feel_max");
    let feel_min = field!("feel_min");
    let feel_mean = field!("feel_mean");

    let mut rows = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let days_since_epoch = dates.get(idx).ok_or_else(|| ObservationError::UnexpectedData {
            station: String::new(),
            message: format!("null date in aggregated daily frame at row {idx}"),
        })?;
        // Polars dates count days from 1970-01-01; chrono's CE day zero is
        // 719_163 days earlier.
        let date = NaiveDate::from_num_days_from_ce_opt(days_since_epoch + 719_163).ok_or_else(
            || ObservationError::UnexpectedData {
                station: String::new(),
                message: format!("unrepresentable date value {days_since_epoch}"),
            },
        )?;
        rows.push(DailySummary {
            date,
            temp_max: opt_float(tmpf_max, idx),
            temp_min: opt_float(tmpf_min, idx),
            temp_mean: opt_float(tmpf_mean, idx),
            dew_point_max: opt_float(dwpf_max, idx),
            dew_point_min: opt_float(dwpf_min, idx),
            dew_point_mean: opt_float(dwpf_mean, idx),
            humidity_max: opt_float(relh_max, idx),
            humidity_min: opt_float(relh_min, idx),
            humidity_mean: opt_float(relh_mean, idx),
            wind_max: opt_float(sknt_max, idx),
            wind_mean: opt_float(sknt_mean, idx),
            gust_max: opt_float(gust_max, idx),
            feels_max: opt_float(feel_max, idx),
            feels_min: opt_float(feel_min, idx),
            feels_mean: opt_float(feel_mean, idx),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly_fixture() -> LazyFrame {
        df!(
            "station" => ["SQL", "SQL", "SQL", "SQL"],
            "valid" => [
                "2023-07-01 00:53",
                "2023-07-01 12:53",
                "2023-07-01 15:53",
                "2023-07-02 12:53",
            ],
            "tmpf" => [Some(55.0), Some(88.0), Some(91.0), Some(72.0)],
            "dwpf" => [Some(50.0), Some(54.0), Some(55.0), Some(51.0)],
            "relh" => [Some(90.0), Some(40.0), Some(33.0), Some(55.0)],
            "sknt" => [Some(3.0), Some(11.0), Some(14.0), Some(8.0)],
            "gust" => [None, Some(21.0), Some(24.0), None::<f64>],
            "feel" => [Some(55.0), Some(89.0), Some(93.0), Some(72.0)],
        )
        .unwrap()
        .lazy()
    }

    #[test]
    fn aggregates_one_row_per_day() {
        let frame = aggregate_daily(hourly_fixture()).unwrap();
        assert_eq!(frame.height(), 2);
        let rows = daily_summaries(&frame).unwrap();

        let first = &rows[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(first.temp_max, Some(91.0));
        assert_eq!(first.temp_min, Some(55.0));
        assert_eq!(first.temp_mean, Some(78.0));
        assert_eq!(first.wind_max, Some(14.0));
        assert_eq!(first.gust_max, Some(24.0));
        assert_eq!(first.feels_max, Some(93.0));

        let second = &rows[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2023, 7, 2).unwrap());
        // A day with no gust observations stays absent, not zero.
        assert_eq!(second.gust_max, None);
    }
}
