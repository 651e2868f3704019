use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    // Errors during parquet writing (inside blocking task)
    #[error("I/O error writing parquet file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing parquet file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to scan parquet cache file '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // Errors during CSV reading (inside blocking task)
    #[error("I/O error processing CSV response for batch {batch}")]
    CsvReadIo {
        batch: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing error processing CSV response for batch {batch}")]
    CsvReadPolars {
        batch: usize,
        #[source]
        source: PolarsError,
    },

    #[error("Column '{column}' missing from response for batch {batch}")]
    MissingColumn { batch: usize, column: String },

    #[error("Failed normalizing response for batch {batch}")]
    Normalize {
        batch: usize,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed to delete cache file '{0}'")]
    CacheDeletion(PathBuf, #[source] std::io::Error),
}
