//! This module provides the main entry point for downloading OISST
//! sea-surface-temperature records from an ERDDAP griddap endpoint, batching
//! long date ranges to stay under the server's span limit.

use crate::error::OisstError;
use crate::sst_data::frame_fetcher::BatchFetcher;
use crate::types::date_batch::{partition_batches, DateBatch};
use crate::types::query::QuerySpec;
use crate::types::sst_frame::SstLazyFrame;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::{info, warn};
use polars::prelude::{concat, UnionArgs};
use std::path::PathBuf;

/// The server refuses single requests spanning much more than this many years.
pub const DEFAULT_MAX_SPAN_YEARS: u32 = 9;

/// Sessions issuing more than roughly this many sequential requests risk
/// being refused by the server.
pub const SESSION_REQUEST_LIMIT: usize = 17;

/// The main client for downloading OISST data.
///
/// Fetches gridded sea-surface-temperature records as Polars `LazyFrame`s in
/// the canonical (lon, lat, date, value) schema, caching every batch response
/// as a parquet file so that re-running an interrupted download only hits the
/// network for batches not yet fetched.
///
/// Create an instance using [`Oisst::new()`] for the default cache directory,
/// [`Oisst::with_cache_folder()`] for a custom cache location, or
/// [`Oisst::connect()`] to also override the ERDDAP server and dataset.
///
/// # Examples
///
/// ```rust
/// # use oisst::{Oisst, OisstError};
/// # async fn run() -> Result<(), OisstError> {
/// let client = Oisst::new().await?;
/// # Ok(())
/// # }
/// ```
pub struct Oisst {
    fetcher: BatchFetcher,
}

#[bon]
impl Oisst {
    /// Creates a client via a builder, with every knob optional.
    ///
    /// # Arguments
    ///
    /// * `.cache_folder(PathBuf)`: Optional. Directory for cached batch files.
    ///   Defaults to the system cache directory (via the `dirs` crate).
    /// * `.server(impl Into<String>)`: Optional. Base ERDDAP URL. Defaults to
    ///   the NOAA CoastWatch server.
    /// * `.dataset(impl Into<String>)`: Optional. griddap dataset identifier.
    ///   Defaults to the quarter-degree OISST v2.1 aggregation with ±180
    ///   longitudes.
    ///
    /// # Errors
    ///
    /// Returns [`OisstError::CacheDirResolution`] if no cache directory can be
    /// determined and [`OisstError::CacheDirCreation`] if it cannot be created.
    #[builder]
    pub async fn connect(
        cache_folder: Option<PathBuf>,
        #[builder(into)] server: Option<String>,
        #[builder(into)] dataset: Option<String>,
    ) -> Result<Self, OisstError> {
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir()?,
        };
        ensure_cache_dir_exists(&cache_folder).await?;
        Ok(Self {
            fetcher: BatchFetcher::new(&cache_folder, server, dataset),
        })
    }

    /// Creates a client using the default cache directory and the default
    /// NOAA ERDDAP endpoint.
    pub async fn new() -> Result<Self, OisstError> {
        Self::connect().call().await
    }

    /// Creates a client with a specified cache directory, created if missing.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, OisstError> {
        Self::connect().cache_folder(cache_folder).call().await
    }

    /// Fetches one [`DateBatch`] of a query: a single remote request (or disk
    /// cache hit) restricted to the batch's date sub-range.
    ///
    /// # Arguments
    ///
    /// * `.spec(&QuerySpec)`: **Required.** Variable, depth, and bounding box;
    ///   the spec's own date range is ignored in favor of the batch's.
    /// * `.batch(&DateBatch)`: **Required.** The date sub-range to request.
    ///
    /// # Errors
    ///
    /// Returns [`OisstError::Fetch`] for network, HTTP status, parse, or cache
    /// I/O failures. No retry is attempted; re-invoke to resume, the batch
    /// cache makes completed work free.
    #[builder]
    pub async fn fetch_batch(
        &self,
        spec: &QuerySpec,
        batch: &DateBatch,
    ) -> Result<SstLazyFrame, OisstError> {
        let frame = self.fetcher.get_cache_lazyframe(spec, batch).await?;
        Ok(SstLazyFrame::new(frame))
    }

    /// Fetches the spec's full date range by partitioning it into batches no
    /// longer than `max_span_years`, requesting them strictly sequentially in
    /// chronological order, and concatenating the results in batch order.
    ///
    /// # Arguments
    ///
    /// * `.spec(&QuerySpec)`: **Required.** What to download.
    /// * `.max_span_years(u32)`: Optional. Maximum span per request. Defaults
    ///   to [`DEFAULT_MAX_SPAN_YEARS`].
    ///
    /// # Errors
    ///
    /// Fails on the first batch that cannot be fetched; nothing is partially
    /// checkpointed beyond the per-batch parquet cache, so re-running the same
    /// call resumes from the first uncached batch.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use oisst::{Oisst, OisstError, QuerySpec, Extent};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), OisstError> {
    /// let client = Oisst::new().await?;
    /// let spec = QuerySpec::builder()
    ///     .latitude(Extent(-40.0, -35.0))
    ///     .longitude(Extent(15.0, 21.0))
    ///     .start(NaiveDate::from_ymd_opt(1982, 1, 1).unwrap())
    ///     .end(NaiveDate::from_ymd_opt(1998, 12, 31).unwrap())
    ///     .build()?;
    ///
    /// let table = client.fetch_all().spec(&spec).call().await?;
    /// let df = table.collect()?;
    /// println!("{}", df.head(Some(5)));
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn fetch_all(
        &self,
        spec: &QuerySpec,
        max_span_years: Option<u32>,
    ) -> Result<SstLazyFrame, OisstError> {
        let max_span_years = max_span_years.unwrap_or(DEFAULT_MAX_SPAN_YEARS);
        if max_span_years == 0 {
            return Err(OisstError::ZeroSpan);
        }

        let batches = partition_batches(spec.start(), spec.end(), max_span_years);
        if batches.len() > SESSION_REQUEST_LIMIT {
            warn!(
                "Partition produced {} batches; the server may refuse sessions \
                 with more than {} requests",
                batches.len(),
                SESSION_REQUEST_LIMIT
            );
        }

        let mut frames = Vec::with_capacity(batches.len());
        for batch in &batches {
            info!(
                "Fetching batch {}/{} ({}..{})",
                batch.index + 1,
                batches.len(),
                batch.start,
                batch.end
            );
            frames.push(self.fetcher.get_cache_lazyframe(spec, batch).await?);
        }

        let combined = concat(frames, UnionArgs::default())?;
        Ok(SstLazyFrame::new(combined))
    }
}

impl Oisst {
    /// Deletes all cached batch files and in-memory frames for this client's
    /// cache directory.
    pub async fn clear_cache(&self) -> Result<(), OisstError> {
        Ok(self.fetcher.clear_cache().await?)
    }
}
