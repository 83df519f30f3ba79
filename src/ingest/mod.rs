//! Reading ingestion: validation and the per-reading pipeline.

pub mod handler;
pub mod validate;

pub use handler::{IngestOutcome, IngestionHandler, NotificationTemplate};
