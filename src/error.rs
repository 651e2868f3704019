use crate::sst_data::error::FetchError;
use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OisstError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,

    #[error("Query start {start} is after end {end}")]
    QueryRange { start: NaiveDate, end: NaiveDate },

    #[error("Extent minimum {min} exceeds maximum {max}")]
    ExtentOrder { min: f64, max: f64 },

    #[error("Extent [{min}, {max}] must be finite")]
    ExtentFinite { min: f64, max: f64 },

    #[error("Latitude extent [{min}, {max}] outside [-90, 90]")]
    LatitudeBounds { min: f64, max: f64 },

    #[error("Longitude extent [{min}, {max}] outside [-180, 180]")]
    LongitudeBounds { min: f64, max: f64 },

    #[error("max_span_years must be at least 1")]
    ZeroSpan,

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
