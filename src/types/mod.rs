pub mod date_batch;
pub mod query;
pub mod sst_frame;
