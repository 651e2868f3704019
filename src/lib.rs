mod error;
mod oisst;
mod sst_data;
mod types;
mod utils;

pub use error::OisstError;
pub use oisst::*;

pub use types::date_batch::{partition_batches, DateBatch};
pub use types::query::{Extent, QuerySpec};
pub use types::sst_frame::SstLazyFrame;

pub use sst_data::error::FetchError;
