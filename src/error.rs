use crate::analysis::trend::TrendError;
use crate::export::ExportError;
use crate::observations::error::ObservationError;
use crate::stations::error::LocateStationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimatrendError {
    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error(transparent)]
    LocateStation(#[from] LocateStationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Trend(#[from] TrendError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
