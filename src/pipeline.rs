//! End-to-end transform: raw observations to tables and matrices.

use crate::export::{ExportError, Exporter};
use crate::normalize::matrix::YearMatrix;
use crate::normalize::normalizer::{NormalizeConfig, NormalizedTable, Normalizer};
use crate::normalize::quality::CompletenessReport;
use log::{info, warn};

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub table: NormalizedTable,
    pub completeness: CompletenessReport,
    /// One matrix per configured variable, in configuration order.
    pub matrices: Vec<YearMatrix>,
}

/// Runs normalization, completeness assessment, and matrix construction over
/// a raw observation stream. Pure: no I/O, deterministic for a given input.
///
/// Completeness flags are advisory. Every configured variable gets a full
/// matrix here; excluding unreliable years is the caller's decision.
///
/// # Examples
///
/// ```
/// use climatrend::{run_pipeline, NormalizeConfig, RawObservation, Variable};
///
/// let raw = vec![
///     RawObservation { date: "2000-02-29".into(), variable: Variable::Tmax, value: 150.0, station: None },
///     RawObservation { date: "2000-03-01".into(), variable: Variable::Tmax, value: 150.0, station: None },
/// ];
/// let report = run_pipeline(raw, &NormalizeConfig::default());
///
/// assert_eq!(report.table.leap_days_removed(), 1);
/// let tmax = &report.matrices[0];
/// assert_eq!(tmax.get(60, 2000), Some(59.0));
/// ```
pub fn run_pipeline<I>(raw: I, config: &NormalizeConfig) -> PipelineReport
where
    I: IntoIterator<Item = crate::normalize::record::RawObservation>,
{
    let table = Normalizer::new(config.clone()).normalize(raw);
    let completeness = CompletenessReport::assess(table.records(), &config.variables);
    for year in completeness.years() {
        if !year.is_complete() {
            let counts = year
                .counts()
                .map(|(variable, count)| format!("{variable}={count}"))
                .collect::<Vec<_>>()
                .join(", ");
            warn!("{}: {} (incomplete)", year.year(), counts);
        }
    }

    let matrices: Vec<YearMatrix> = config
        .variables
        .iter()
        .map(|variable| YearMatrix::build(variable.clone(), table.records()))
        .collect();
    for matrix in &matrices {
        info!(
            "{} matrix: {} days x {} years, {} missing cells",
            matrix.variable(),
            crate::normalize::date_index::DAYS_PER_YEAR,
            matrix.num_years(),
            matrix.missing_cells()
        );
    }

    PipelineReport {
        table,
        completeness,
        matrices,
    }
}

/// [`run_pipeline`] plus CSV artifacts written through `exporter`.
pub fn run_pipeline_to_sink<I>(
    raw: I,
    config: &NormalizeConfig,
    exporter: &Exporter,
) -> Result<PipelineReport, ExportError>
where
    I: IntoIterator<Item = crate::normalize::record::RawObservation>,
{
    let report = run_pipeline(raw, config);
    exporter.write_normalized(&report.table)?;
    for matrix in &report.matrices {
        exporter.write_matrix(matrix)?;
    }
    Ok(report)
}
