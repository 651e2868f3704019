use crate::sst_data::data_loader::BatchLoader;
use crate::sst_data::error::FetchError;
use crate::types::date_batch::DateBatch;
use crate::types::query::QuerySpec;
use polars::prelude::LazyFrame;
use std::collections::{hash_map::Entry, HashMap};
use std::path::Path;
use tokio::sync::Mutex;

/// Fronts the on-disk batch cache with an in-memory `LazyFrame` cache keyed
/// by the full tuple of query parameters for a batch.
pub struct BatchFetcher {
    loader: BatchLoader,
    lazyframe_cache: Mutex<HashMap<String, LazyFrame>>,
}

impl BatchFetcher {
    pub fn new(cache_dir: &Path, server: Option<String>, dataset: Option<String>) -> Self {
        Self {
            loader: BatchLoader::new(cache_dir, server, dataset),
            lazyframe_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Gets the canonical frame for one batch, using the in-memory cache if
    /// possible and falling back to the loader (disk cache, then network).
    pub async fn get_cache_lazyframe(
        &self,
        spec: &QuerySpec,
        batch: &DateBatch,
    ) -> Result<LazyFrame, FetchError> {
        let key = self.loader.cache_file_name(spec, batch);

        // Fast path: already loaded this session.
        {
            let cache = self.lazyframe_cache.lock().await;
            if let Some(cached_frame) = cache.get(&key) {
                return Ok(cached_frame.clone());
            }
            // Not in cache, release the lock before loading
        }

        // Slow path: load outside the lock. Only one in-flight request exists
        // per client in practice, since batches are fetched sequentially.
        let loaded_frame = self.loader.get_frame(spec, batch).await?;

        let mut cache = self.lazyframe_cache.lock().await;
        match cache.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(loaded_frame.clone());
                Ok(loaded_frame)
            }
        }
    }

    /// Drops the in-memory frames and deletes the cached parquet files.
    pub async fn clear_cache(&self) -> Result<(), FetchError> {
        self.lazyframe_cache.lock().await.clear();
        self.loader.clear_cache().await
    }
}
