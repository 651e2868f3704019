//! Contains the `SstLazyFrame` structure wrapping the canonical
//! (lon, lat, date, value) table produced by batch fetches.

use crate::error::OisstError;
use crate::sst_data::error::FetchError;
use chrono::NaiveDate;
use polars::prelude::{col, lit, DataFrame, Expr, LazyFrame, ParquetCompression, ParquetWriter};
use std::path::Path;
use tokio::task;

/// A wrapper around a Polars `LazyFrame` holding records in the canonical
/// four-column schema: `lon`, `lat`, `date`, `value`.
///
/// Instances are produced by [`crate::Oisst::fetch_batch`] and
/// [`crate::Oisst::fetch_all`]. Rows appear in batch order; within a batch,
/// in whatever order the server returned them.
///
/// # Errors
///
/// Operations that trigger computation on the underlying `LazyFrame` (such as
/// [`SstLazyFrame::collect`]) can return a [`polars::prelude::PolarsError`]
/// if the computation fails.
#[derive(Clone)]
pub struct SstLazyFrame {
    /// The underlying Polars LazyFrame containing the canonical records.
    pub frame: LazyFrame,
}

impl SstLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Filters the records with an arbitrary Polars predicate expression,
    /// returning a new `SstLazyFrame` with the filter applied lazily.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use oisst::{Oisst, OisstError, QuerySpec, Extent};
    /// use polars::prelude::{col, lit};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = Oisst::new().await?;
    /// # let spec = QuerySpec::builder()
    /// #     .latitude(Extent(-40.0, -35.0))
    /// #     .longitude(Extent(15.0, 21.0))
    /// #     .start(chrono::NaiveDate::from_ymd_opt(1982, 1, 1).unwrap())
    /// #     .end(chrono::NaiveDate::from_ymd_opt(1982, 12, 31).unwrap())
    /// #     .build()?;
    /// let table = client.fetch_all().spec(&spec).call().await?;
    /// let warm = table.filter(col("value").gt(lit(21.0f64)));
    /// println!("{}", warm.collect()?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> SstLazyFrame {
        SstLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps only records whose `date` lies within `[start, end]` (inclusive).
    pub fn get_range(&self, start: NaiveDate, end: NaiveDate) -> SstLazyFrame {
        self.filter(
            col("date")
                .gt_eq(lit(start))
                .and(col("date").lt_eq(lit(end))),
        )
    }

    /// Executes the lazy plan and materializes the table.
    pub fn collect(&self) -> Result<DataFrame, OisstError> {
        Ok(self.frame.clone().collect()?)
    }

    /// Serializes the table to a Snappy-compressed parquet file, overwriting
    /// any existing file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`OisstError::Polars`] if collecting the frame fails, and
    /// [`crate::FetchError::ParquetWriteIo`] (wrapped) if `path`'s directory
    /// does not exist or is not writable.
    pub async fn save_parquet(&self, path: &Path) -> Result<(), OisstError> {
        let mut df = self.frame.clone().collect()?;
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
        .await
        .map_err(FetchError::from)??;
        Ok(())
    }
}
