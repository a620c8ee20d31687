//! Core data model types.
//!
//! Ingestion produces an in-memory [`DataSet`] of typed [`Row`]s. Query keys are expressed with
//! [`StateFilter`], [`ZipCode`], [`ReportingWeek`] and [`Modality`]; each of them can only be
//! constructed from a well-formed value, so the query engine never sees raw user strings.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// The 50 two-letter U.S. state codes accepted as query keys.
pub const STATE_CODES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

/// Reported mode of instruction for a district in a given week.
///
/// Variants are declared in report order, which is also their [`Ord`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Modality {
    #[serde(rename = "In Person")]
    InPerson,
    Hybrid,
    Remote,
}

impl Modality {
    /// Every modality, in report order.
    pub const ALL: [Modality; 3] = [Modality::InPerson, Modality::Hybrid, Modality::Remote];

    /// Label used by the source data.
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::InPerson => "In Person",
            Modality::Hybrid => "Hybrid",
            Modality::Remote => "Remote",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Modality::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| "expected modality (In Person/Hybrid/Remote)".to_string())
    }
}

/// A validated, upper-cased two-letter state code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct StateCode([u8; 2]);

impl StateCode {
    /// Parse a state code, normalizing case. Returns `None` for anything outside [`STATE_CODES`].
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let code = STATE_CODES.iter().find(|c| **c == upper)?;
        let bytes = code.as_bytes();
        Some(Self([bytes[0], bytes[1]]))
    }

    pub fn as_str(&self) -> &str {
        // Only constructed from ASCII entries of STATE_CODES.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.as_str().to_string()
    }
}

/// State key for state-based queries: a single state or the `ALL` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum StateFilter {
    /// Aggregate over every state.
    All,
    /// Restrict to one state.
    State(StateCode),
}

impl StateFilter {
    /// Parse user input: `all` (any case) or one of the 50 state codes.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        StateCode::parse(s).map(Self::State)
    }

    /// Whether a row's state column passes this filter.
    pub fn matches(&self, state: &str) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::State(code) => code.as_str() == state,
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateFilter::All => f.write_str("ALL"),
            StateFilter::State(code) => code.fmt(f),
        }
    }
}

impl From<StateFilter> for String {
    fn from(filter: StateFilter) -> Self {
        filter.to_string()
    }
}

/// A five-digit zip code query key in `10000..=99999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ZipCode(u32);

impl ZipCode {
    pub const MIN: u32 = 10_000;
    pub const MAX: u32 = 99_999;

    pub fn new(zip: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&zip).then_some(Self(zip))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// Timestamp format of the `week` column in the source data, e.g. `01/04/2021 12:00:00 AM`.
pub const WEEK_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// User-facing date format for reporting weeks.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Canonical reporting-week value.
///
/// The source column is parsed once at load time; queries compare values, never strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportingWeek(NaiveDateTime);

impl ReportingWeek {
    /// Parse the source-data encoding (`MM/DD/YYYY HH:MM:SS AM|PM`).
    pub fn parse_timestamp(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s.trim(), WEEK_TIMESTAMP_FORMAT).map(Self)
    }

    /// The reporting week for a calendar date: the dataset stamps every week at midnight.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl fmt::Display for ReportingWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// One district's report for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// NCES district id (displayed zero-padded to 7 digits).
    pub district_id: u64,
    pub district_name: String,
    pub week: ReportingWeek,
    pub modality: Modality,
    pub operational_schools: u64,
    pub student_count: u64,
    pub city: String,
    /// Two-letter state code as it appears in the source.
    pub state: String,
    pub zip_code: u32,
}

/// In-memory dataset: an ordered, read-only sequence of [`Row`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSet {
    rows: Vec<Row>,
}

impl DataSet {
    /// Create a dataset from rows. Row order is preserved by every query.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All rows, in load order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Borrow every row that matches `predicate`, preserving dataset order.
    ///
    /// The dataset itself is never modified; callers receive a view.
    pub fn select<F>(&self, mut predicate: F) -> Vec<&Row>
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.iter().filter(|row| predicate(row)).collect()
    }
}

impl FromIterator<Row> for DataSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_parse_normalizes_case() {
        assert_eq!(StateCode::parse("ca").map(|c| c.to_string()), Some("CA".to_string()));
        assert_eq!(StateCode::parse(" Tx ").map(|c| c.to_string()), Some("TX".to_string()));
        assert!(StateCode::parse("DC").is_none());
        assert!(StateCode::parse("C").is_none());
    }

    #[test]
    fn state_filter_parses_all_sentinel() {
        assert_eq!(StateFilter::parse("all"), Some(StateFilter::All));
        assert_eq!(StateFilter::parse("ALL"), Some(StateFilter::All));
        assert!(StateFilter::parse("ZZ").is_none());
        assert!(StateFilter::All.matches("PR"));
        assert!(StateFilter::parse("mo").unwrap().matches("MO"));
        assert!(!StateFilter::parse("mo").unwrap().matches("IL"));
    }

    #[test]
    fn zip_code_bounds_are_inclusive() {
        assert!(ZipCode::new(9_999).is_none());
        assert_eq!(ZipCode::new(10_000).map(ZipCode::get), Some(10_000));
        assert_eq!(ZipCode::new(99_999).map(ZipCode::get), Some(99_999));
        assert!(ZipCode::new(100_000).is_none());
    }

    #[test]
    fn reporting_week_from_date_matches_source_encoding() {
        let parsed = ReportingWeek::parse_timestamp("01/04/2021 12:00:00 AM").unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        assert_eq!(ReportingWeek::from_date(date), parsed);
        assert_eq!(parsed.to_string(), "01/04/2021");
    }

    #[test]
    fn reporting_week_noon_is_a_different_week_value() {
        let noon = ReportingWeek::parse_timestamp("01/04/2021 12:00:00 PM").unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        assert_ne!(ReportingWeek::from_date(date), noon);
    }

    #[test]
    fn modality_from_str_accepts_source_labels() {
        assert_eq!("In Person".parse::<Modality>(), Ok(Modality::InPerson));
        assert_eq!("hybrid".parse::<Modality>(), Ok(Modality::Hybrid));
        assert!("Mixed".parse::<Modality>().is_err());
    }

    #[test]
    fn modality_serializes_with_source_label() {
        assert_eq!(serde_json::to_string(&Modality::InPerson).unwrap(), "\"In Person\"");
        assert_eq!(serde_json::to_string(&StateFilter::All).unwrap(), "\"ALL\"");
    }
}
