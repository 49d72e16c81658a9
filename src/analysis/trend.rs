//! Seam for trend-line fitting.
//!
//! Regression itself lives with the caller: analyses here assemble the
//! (year, value) series and hand equal-length slices to a [`TrendEstimator`].
//! Any least-squares routine that reports slope, intercept, correlation, and
//! p-value can be plugged in.

use thiserror::Error;

/// A fitted linear trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    /// Change in y per unit of x (per year, for yearly series).
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient of the fit.
    pub r_value: f64,
    /// Two-sided p-value for a zero-slope null hypothesis.
    pub p_value: f64,
}

impl TrendLine {
    /// The fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Whether the slope is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("series lengths differ: {x} x values against {y} y values")]
    LengthMismatch { x: usize, y: usize },

    #[error("need at least {required} points to fit a trend, got {got}")]
    NotEnoughPoints { required: usize, got: usize },

    #[error("trend estimator failed")]
    Estimator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A provider of linear fits over two equal-length numeric sequences.
pub trait TrendEstimator {
    fn fit(&self, x: &[f64], y: &[f64]) -> Result<TrendLine, TrendError>;
}

/// Fits a trend over a yearly series with possibly missing values.
///
/// Pairs where the value is absent are dropped before fitting. Returns
/// `Ok(None)` when fewer than three observed pairs remain, which is too short
/// for a meaningful fit.
pub fn series_trend(
    years: &[i32],
    values: &[Option<f64>],
    estimator: &dyn TrendEstimator,
) -> Result<Option<TrendLine>, TrendError> {
    if years.len() != values.len() {
        return Err(TrendError::LengthMismatch {
            x: years.len(),
            y: values.len(),
        });
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = years
        .iter()
        .zip(values)
        .filter_map(|(&year, value)| value.map(|v| (f64::from(year), v)))
        .unzip();
    if xs.len() < 3 {
        return Ok(None);
    }
    estimator.fit(&xs, &ys).map(Some)
}
