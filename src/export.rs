//! CSV-shaped output artifacts for the reporting collaborator.

use crate::normalize::date_index::DAYS_PER_YEAR;
use crate::normalize::matrix::YearMatrix;
use crate::normalize::normalizer::NormalizedTable;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to create output file '{0}'")]
    FileCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV file '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to assemble output table: {0}")]
    Frame(#[from] PolarsError),
}

/// The flat normalized table as a DataFrame with columns
/// `date, year, month, day, doy, variable, value`.
pub fn normalized_frame(table: &NormalizedTable) -> Result<DataFrame, ExportError> {
    let records = table.records();
    let mut dates = Vec::with_capacity(records.len());
    let mut years = Vec::with_capacity(records.len());
    let mut months = Vec::with_capacity(records.len());
    let mut days = Vec::with_capacity(records.len());
    let mut doys = Vec::with_capacity(records.len());
    let mut variables = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());
    for record in records {
        dates.push(record.date.to_string());
        years.push(record.year);
        months.push(record.month as i32);
        days.push(record.day as i32);
        doys.push(record.doy as i32);
        variables.push(record.variable.code().to_string());
        values.push(record.value);
    }
    let frame = df!(
        "date" => dates,
        "year" => years,
        "month" => months,
        "day" => days,
        "doy" => doys,
        "variable" => variables,
        "value" => values,
    )?;
    Ok(frame)
}

/// A year matrix as a DataFrame: a `doy` column (1..=365) plus one column per
/// year, missing cells as nulls.
pub fn matrix_frame(matrix: &YearMatrix) -> Result<DataFrame, ExportError> {
    let mut columns: Vec<Column> = Vec::with_capacity(matrix.num_years() + 1);
    let doys: Vec<i32> = (1..=DAYS_PER_YEAR as i32).collect();
    columns.push(Series::new("doy".into(), doys).into_column());
    for (year, cells) in matrix.columns() {
        columns.push(Series::new(year.to_string().into(), cells.to_vec()).into_column());
    }
    Ok(DataFrame::new(columns)?)
}

/// Writes the pipeline's CSV artifacts into a caller-chosen directory.
///
/// Paths are explicit configuration; nothing is derived from process-wide
/// state.
#[derive(Debug, Clone)]
pub struct Exporter {
    out_dir: PathBuf,
}

impl Exporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Writes the flat normalized table to `daily_clean.csv`.
    pub fn write_normalized(&self, table: &NormalizedTable) -> Result<PathBuf, ExportError> {
        let frame = normalized_frame(table)?;
        self.write_frame(frame, "daily_clean.csv")
    }

    /// Writes one matrix to `<variable>_matrix.csv` (lower-cased code).
    pub fn write_matrix(&self, matrix: &YearMatrix) -> Result<PathBuf, ExportError> {
        let frame = matrix_frame(matrix)?;
        let file_name = format!("{}_matrix.csv", matrix.variable().code().to_lowercase());
        self.write_frame(frame, &file_name)
    }

    fn write_frame(&self, mut frame: DataFrame, file_name: &str) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| ExportError::OutputDirCreation(self.out_dir.clone(), e))?;
        let path = self.out_dir.join(file_name);
        let mut file = std::fs::File::create(&path)
            .map_err(|e| ExportError::FileCreation(path.clone(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|e| ExportError::CsvWrite(path.clone(), e))?;
        info!("wrote {} ({} rows)", path.display(), frame.height());
        Ok(path)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
