use crate::sst_data::error::FetchError;
use crate::types::date_batch::DateBatch;
use crate::types::query::QuerySpec;
use log::{info, warn};
use polars::frame::DataFrame;
use polars::prelude::*;
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

pub const DEFAULT_SERVER: &str = "https://coastwatch.pfeg.noaa.gov/erddap";
pub const DEFAULT_DATASET: &str = "ncdcOisst21Agg_LonPM180";

/// Name of the timestamp column in griddap CSV responses.
const TIME_COLUMN: &str = "time";

pub struct BatchLoader {
    cache_dir: PathBuf,
    download_client: Client,
    server: String,
    dataset: String,
}

impl BatchLoader {
    pub fn new(cache_dir: &Path, server: Option<String>, dataset: Option<String>) -> BatchLoader {
        BatchLoader {
            cache_dir: cache_dir.to_path_buf(),
            download_client: Client::new(),
            server: server.unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            dataset: dataset.unwrap_or_else(|| DEFAULT_DATASET.to_string()),
        }
    }

    /// Loads the canonical (lon, lat, date, value) frame for one batch of a
    /// query. Downloads and normalizes on a cache miss; otherwise scans the
    /// previously cached parquet file without touching the network.
    pub async fn get_frame(
        &self,
        spec: &QuerySpec,
        batch: &DateBatch,
    ) -> Result<LazyFrame, FetchError> {
        let parquet_path = self.cache_dir.join(self.cache_file_name(spec, batch));

        if fs::metadata(&parquet_path).await.is_ok() {
            info!(
                "Cache hit for batch {} ({}..{}) at {:?}",
                batch.index, batch.start, batch.end, parquet_path
            );
        } else {
            warn!(
                "Cache miss for batch {} ({}..{}). Downloading and processing.",
                batch.index, batch.start, batch.end
            );

            let url = self.griddap_url(spec, batch);
            let raw_bytes = self.download(&url, batch.index).await?;
            let df =
                Self::csv_to_dataframe(raw_bytes, spec.variable().to_string(), batch.index).await?;

            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(|e| FetchError::CacheDirCreation(self.cache_dir.clone(), e))?;

            Self::cache_dataframe(df, &parquet_path).await?;
            info!(
                "Cached batch {} ({}..{}) to {:?}",
                batch.index, batch.start, batch.end, parquet_path
            );
        }

        LazyFrame::scan_parquet(&parquet_path, Default::default())
            .map_err(|e| FetchError::ParquetScan(parquet_path.clone(), e))
    }

    /// Cache key: the full tuple of parameters identifying one batch request,
    /// including the server and dataset, so clients sharing a cache directory
    /// but targeting different endpoints never serve each other's data.
    /// Identical re-runs resolve to the same file.
    pub(crate) fn cache_file_name(&self, spec: &QuerySpec, batch: &DateBatch) -> String {
        let depth = spec.depth();
        let lat = spec.latitude();
        let lon = spec.longitude();
        format!(
            "{}_{}_{}_z{}_{}_lat{}_{}_lon{}_{}_{}_{}.parquet",
            path_safe(&self.server),
            path_safe(&self.dataset),
            spec.variable(),
            depth.0,
            depth.1,
            lat.0,
            lat.1,
            lon.0,
            lon.1,
            batch.start,
            batch.end
        )
    }

    /// Builds the griddap CSV request URL for one batch, restricted to the
    /// spec's variable, depth level, and bounding box.
    pub(crate) fn griddap_url(&self, spec: &QuerySpec, batch: &DateBatch) -> String {
        let depth = spec.depth();
        let lat = spec.latitude();
        let lon = spec.longitude();
        format!(
            "{}/griddap/{}.csv?{}[({}T00:00:00Z):1:({}T00:00:00Z)][({}):1:({})][({}):1:({})][({}):1:({})]",
            self.server,
            self.dataset,
            spec.variable(),
            batch.start,
            batch.end,
            depth.0,
            depth.1,
            lat.0,
            lat.1,
            lon.0,
            lon.1,
        )
    }

    async fn download(&self, url: &str, batch: usize) -> Result<Vec<u8>, FetchError> {
        info!("Downloading batch {} from {}", batch, url);

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;
        info!(
            "Successfully downloaded {} bytes for batch {}",
            bytes.len(),
            batch
        );
        Ok(bytes.to_vec())
    }

    /// Parses raw griddap CSV bytes into the canonical frame using a blocking
    /// task. The response carries a header row followed by one units row,
    /// which is skipped.
    async fn csv_to_dataframe(
        bytes: Vec<u8>,
        variable: String,
        batch: usize,
    ) -> Result<DataFrame, FetchError> {
        task::spawn_blocking(move || {
            let mut temp_file =
                NamedTempFile::new().map_err(|e| FetchError::CsvReadIo { batch, source: e })?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| FetchError::CsvReadIo { batch, source: e })?;
            temp_file
                .flush()
                .map_err(|e| FetchError::CsvReadIo { batch, source: e })?;

            let df = CsvReadOptions::default()
                .with_has_header(true)
                .with_skip_rows_after_header(1)
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .map_err(|e| FetchError::CsvReadPolars { batch, source: e })?
                .finish()
                .map_err(|e| FetchError::CsvReadPolars { batch, source: e })?;

            normalize(df, &variable, batch)
        })
        .await?
    }

    /// Writes a normalized batch frame to its parquet cache file.
    async fn cache_dataframe(mut df: DataFrame, path: &Path) -> Result<(), FetchError> {
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| FetchError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| FetchError::ParquetWritePolars(path_buf, e))?;
            Ok::<(), FetchError>(())
        })
        .await??;
        Ok(())
    }

    /// Deletes every cached batch parquet file in the cache directory.
    pub async fn clear_cache(&self) -> Result<(), FetchError> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| FetchError::CacheDeletion(self.cache_dir.clone(), e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FetchError::CacheDeletion(self.cache_dir.clone(), e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "parquet") {
                info!("Deleting cached batch file {:?}", path);
                fs::remove_file(&path)
                    .await
                    .map_err(|e| FetchError::CacheDeletion(path.clone(), e))?;
            }
        }
        Ok(())
    }
}

/// Reduces a URL or dataset identifier to a filename-safe token.
fn path_safe(component: &str) -> String {
    component
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Reshapes a raw griddap response frame into the canonical schema:
/// renames the timestamp to `date` (stripping time-of-day and timezone), the
/// measurement to `value`, selects exactly (lon, lat, date, value), and drops
/// rows with a missing value in any field.
pub(crate) fn normalize(
    df: DataFrame,
    variable: &str,
    batch: usize,
) -> Result<DataFrame, FetchError> {
    for column in ["longitude", "latitude", TIME_COLUMN, variable] {
        if !df
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == column)
        {
            return Err(FetchError::MissingColumn {
                batch,
                column: column.to_string(),
            });
        }
    }

    df.lazy()
        .select([
            col("longitude").cast(DataType::Float64).alias("lon"),
            col("latitude").cast(DataType::Float64).alias("lat"),
            // The first ten characters of the ISO-8601 timestamp are the
            // calendar date; anything after is time-of-day/zone suffix.
            col(TIME_COLUMN)
                .str()
                .slice(lit(0), lit(10))
                .str()
                .to_date(StrptimeOptions {
                    format: Some("%Y-%m-%d".into()),
                    strict: false,
                    exact: true,
                    cache: true,
                })
                .alias("date"),
            // griddap encodes missing measurements as NaN in CSV output.
            col(variable)
                .cast(DataType::Float64)
                .fill_nan(lit(NULL))
                .alias("value"),
        ])
        .drop_nulls(None)
        .collect()
        .map_err(|e| FetchError::Normalize { batch, source: e })
}
