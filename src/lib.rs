//! `learning-modalities` answers questions about the U.S. "School Learning Modalities" dataset:
//! how many schools and students were taught in person, hybrid, or remotely in a given
//! reporting week, by state or by district zip code.
//!
//! The CSV export is loaded once into an in-memory [`types::DataSet`] and then queried with
//! pure functions; nothing is cached between queries.
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV loading and load observers
//! - [`types`]: rows, dataset, and typed query keys
//! - [`validate`]: predicates for user-supplied state codes, zip codes, and dates
//! - [`processing`]: the query engine (filter) and aggregator (reduce)
//! - [`report`]: state and district reports with text rendering
//! - [`download`]: fetching the export (the HTTP client needs cargo feature `download`)
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```no_run
//! use learning_modalities::ingestion::{ingest_from_path, IngestionOptions};
//! use learning_modalities::report::StateReport;
//! use learning_modalities::types::{ReportingWeek, StateFilter};
//! use learning_modalities::validate::parse_date;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ds = ingest_from_path("data.csv", &IngestionOptions::default())?;
//! let week = ReportingWeek::from_date(parse_date("01/04/2021").ok_or("bad date")?);
//! let state = StateFilter::parse("mo").ok_or("bad state")?;
//! println!("{}", StateReport::build(&ds, state, week));
//! # Ok(())
//! # }
//! ```
//!
//! ### Empty results
//!
//! An unknown week, state, or zip code is not an error: queries return empty row vectors and
//! sums of 0. The only failing aggregate is [`processing::percentage_of`] with a zero total.

pub mod download;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod report;
pub mod types;
pub mod validate;

pub use error::{IngestionError, IngestionResult, QueryError, QueryResult};
