pub mod asos;
pub mod daily_summary;
pub mod error;
pub mod noaa;
