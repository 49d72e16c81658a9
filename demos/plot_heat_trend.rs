//! demos/plot_heat_trend.rs
//!
//! Fetches the full daily history for the Redwood City station, runs the
//! normalization pipeline, counts hot days per year, and plots the series
//! with a fitted trend line using `plotlars`.
//!
//! To run this demo:
//! NOAA_TOKEN=... cargo run --example plot_heat_trend --features examples

use std::error::Error;

use chrono::NaiveDate;
use climatrend::{
    count_heat_days, heat_day_trends, run_pipeline, Climatrend, LatLon, NormalizeConfig,
    TrendEstimator, TrendError, TrendLine,
};
use plotlars::{Line, Plot, Rgb, Text, TimeSeriesPlot};
use polars::prelude::*;

/// Ordinary least squares, enough for a demo plot. The p-value would need a
/// t-distribution; the plot does not use it, so it stays NaN.
struct LeastSquares;

impl TrendEstimator for LeastSquares {
    fn fit(&self, x: &[f64], y: &[f64]) -> Result<TrendLine, TrendError> {
        let n = x.len();
        if n != y.len() {
            return Err(TrendError::LengthMismatch { x: n, y: y.len() });
        }
        if n < 2 {
            return Err(TrendError::NotEnoughPoints { required: 2, got: n });
        }
        let nf = n as f64;
        let mean_x = x.iter().sum::<f64>() / nf;
        let mean_y = y.iter().sum::<f64>() / nf;
        let mut ss_xy = 0.0;
        let mut ss_xx = 0.0;
        let mut ss_yy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            ss_xy += (xi - mean_x) * (yi - mean_y);
            ss_xx += (xi - mean_x) * (xi - mean_x);
            ss_yy += (yi - mean_y) * (yi - mean_y);
        }
        let slope = ss_xy / ss_xx;
        let r_value = if ss_yy == 0.0 {
            0.0
        } else {
            ss_xy / (ss_xx * ss_yy).sqrt()
        };
        Ok(TrendLine {
            slope,
            intercept: mean_y - slope * mean_x,
            r_value,
            p_value: f64::NAN,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let token = std::env::var("NOAA_TOKEN")?;
    let client = Climatrend::new(token).await?;

    let station = client
        .find_station()
        .county_fips("06081") // San Mateo County, CA
        .name_contains(vec!["REDWOOD".into(), "CITY".into()])
        .near(LatLon(37.4848, -122.2281))
        .call()
        .await?;
    println!("Using station {} ({})", station.name, station.id);

    let raw = client
        .daily_observations()
        .station(&station.id)
        .start(NaiveDate::from_ymd_opt(1948, 1, 1).unwrap())
        .call()
        .await?;

    let report = run_pipeline(raw, &NormalizeConfig::default());
    let counts = count_heat_days(report.table.records());
    let trends = heat_day_trends(&counts, &LeastSquares)?;
    println!(
        "Trend: {:+.3} days above 90F per year (r={:.3})",
        trends.above_90.slope, trends.above_90.r_value
    );

    let years: Vec<String> = counts.iter().map(|c| format!("{}-01-01", c.year)).collect();
    let observed: Vec<f64> = counts.iter().map(|c| f64::from(c.days_above_90)).collect();
    let fitted: Vec<f64> = counts
        .iter()
        .map(|c| trends.above_90.predict(f64::from(c.year)))
        .collect();
    let frame: DataFrame = df!(
        "year" => years,
        "days_above_90" => observed,
        "trend" => fitted,
    )?;

    println!("Generating heat trend plot...");
    plot_heat_days(&frame);
    println!("Plot shown in browser.");

    Ok(())
}

/// Plots observed hot-day counts per year with the fitted trend line.
fn plot_heat_days(frame: &DataFrame) {
    TimeSeriesPlot::builder()
        .data(frame)
        .x("year")
        .y("days_above_90")
        .additional_series(vec!["trend"])
        .size(8)
        .colors(vec![Rgb(215, 48, 31), Rgb(127, 0, 0)])
        .lines(vec![Line::Solid, Line::Dash])
        .plot_title(Text::from("Days Above 90F Per Year").size(18))
        .x_title("year")
        .y_title("days above 90F")
        .build()
        .plot();
}
