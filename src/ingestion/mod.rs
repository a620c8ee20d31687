//! Loading the learning-modality export into memory.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - loads the CSV into an in-memory [`crate::types::DataSet`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! The raw reader-based loader lives in [`csv`]; fetching the file lives in
//! [`crate::download`].

pub mod csv;
pub mod observability;
pub mod unified;

pub use self::csv::{has_required_columns, ingest_csv_from_path, ingest_csv_from_reader, REQUIRED_COLUMNS};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use unified::{ingest_from_path, IngestionOptions};
