//! Historical weather station records: fetch, align, analyze.
//!
//! The crate turns a station's irregular daily history into tables that can
//! be compared across years. The load-bearing piece is the day-of-year
//! alignment: February 29 is removed (with accounting) and later dates in
//! leap years shift down one slot, so every year occupies the same 365
//! positions. On top of that sit per-year completeness accounting, dense
//! year-by-day matrices with first-write-wins duplicate handling, and the
//! yearly heat/humidity/feels-like aggregates used for trend reporting.
//! Trend fitting itself is pluggable through [`TrendEstimator`].

mod analysis;
mod climatrend;
mod error;
mod export;
mod normalize;
mod observations;
mod pipeline;
mod stations;
mod utils;

pub use error::ClimatrendError;
pub use climatrend::*;

pub use normalize::date_index::{
    index_date, parse_observation_date, DateIndex, DayIndex, InvalidDateError, DAYS_PER_YEAR,
};
pub use normalize::matrix::{DayExtreme, YearMatrix};
pub use normalize::normalizer::{
    NormalizeConfig, NormalizedTable, Normalizer, RejectedObservation,
};
pub use normalize::quality::{
    CompletenessReport, YearCompleteness, COMPLETE_YEAR_THRESHOLD,
};
pub use normalize::record::{NormalizedRecord, RawObservation, TemperatureUnit, Variable};

pub use analysis::feels_like::{
    count_feels_like_days, feels_like_trends, FeelsLikeDays, FeelsLikeTrends,
};
pub use analysis::heat_days::{count_heat_days, heat_day_trends, HeatDays, HeatTrends};
pub use analysis::humidity_wind::{
    atmosphere_trends, yearly_atmosphere, AtmosphereTrends, YearlyAtmosphere, SUMMER_MONTHS,
};
pub use analysis::trend::{series_trend, TrendEstimator, TrendError, TrendLine};
pub use analysis::{is_school_month, EXTREME_DAY_F, FREEZING_F, HOT_DAY_F};

pub use observations::asos::AsosHourlyClient;
pub use observations::daily_summary::{aggregate_daily, daily_summaries, DailySummary};
pub use observations::error::ObservationError;
pub use observations::noaa::NoaaDailyClient;

pub use stations::error::LocateStationError;
pub use stations::locate_station::{Station, StationLocator};

pub use export::{matrix_frame, normalized_frame, ExportError, Exporter};
pub use pipeline::{run_pipeline, run_pipeline_to_sink, PipelineReport};
