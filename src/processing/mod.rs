//! The query engine and aggregator.
//!
//! Everything here is a pure function of a borrowed [`crate::types::DataSet`] and a set of
//! typed keys. Nothing is cached between calls, so repeated queries always reflect the full
//! dataset.
//!
//! - [`filter_rows()`] / [`filter_by_zip()`]: exact-match row selection
//! - [`available_weeks()`]: distinct reporting weeks, newest first
//! - [`sum_schools()`], [`sum_students()`], [`modality_breakdown()`], [`percentage_of()`]
//!
//! ## Example: filter → reduce
//!
//! ```rust
//! use chrono::NaiveDate;
//! use learning_modalities::processing::{filter_rows, modality_breakdown, percentage_of, sum_schools};
//! use learning_modalities::types::{DataSet, Modality, ReportingWeek, Row, StateFilter};
//!
//! let week = ReportingWeek::from_date(NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
//! let row = |modality, schools, students| Row {
//!     district_id: 600001,
//!     district_name: "Example Unified".to_string(),
//!     week,
//!     modality,
//!     operational_schools: schools,
//!     student_count: students,
//!     city: "Example".to_string(),
//!     state: "CA".to_string(),
//!     zip_code: 90001,
//! };
//! let ds = DataSet::new(vec![row(Modality::InPerson, 100, 5000), row(Modality::Remote, 20, 800)]);
//!
//! let ca = StateFilter::parse("ca").unwrap();
//! let rows = filter_rows(&ds, &ca, week, None);
//! assert_eq!(sum_schools(&rows), 120);
//!
//! let breakdown = modality_breakdown(&ds, &ca, week);
//! let share = percentage_of(breakdown[Modality::InPerson].schools, 120).unwrap();
//! assert!((share - 0.8333).abs() < 1e-4);
//! ```

pub mod filter;
pub mod reduce;

pub use filter::{available_weeks, filter_by_zip, filter_rows};
pub use reduce::{
    modality_breakdown, percentage_of, sum_schools, sum_students, ModalityBreakdown, ModalityCounts,
};
