use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for query/aggregation operations that can fail.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error type returned by ingestion (and download) functions.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "download")]
    /// HTTP error while fetching the dataset (feature-gated behind `download`).
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    #[cfg(feature = "download")]
    /// The server announced more bytes than it sent.
    #[error("download truncated: received {received} of {expected} bytes")]
    Truncated { received: u64, expected: u64 },

    /// The input does not have the expected shape (missing columns, wrong header, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A cell could not be parsed into the type of its [`crate::types::Row`] field.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by the aggregator.
///
/// Empty results are not errors; they are represented as empty row sequences and zero sums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A percentage was requested against a zero total.
    #[error("division by zero: cannot express {part} as a share of 0")]
    DivisionByZero { part: u64 },
}
