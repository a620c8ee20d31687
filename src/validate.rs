//! Pure predicates over user-supplied query keys.
//!
//! Retry/re-prompt behavior belongs to the caller; these functions only answer whether an input
//! is well-formed. Once a predicate passes, the matching typed constructor
//! ([`crate::types::StateFilter::parse`], [`ZipCode::new`], [`parse_date`]) turns the input
//! into a query key.

use chrono::NaiveDate;

use crate::types::{DATE_FORMAT, StateCode, ZipCode};

/// True iff `s`, trimmed and upper-cased, is one of the 50 state codes. The `ALL` sentinel is
/// not a state code; see [`crate::types::StateFilter::parse`].
pub fn is_valid_state_code(s: &str) -> bool {
    StateCode::parse(s).is_some()
}

/// True iff `zip` is within `10000..=99999`.
pub fn is_valid_zip_code(zip: u32) -> bool {
    ZipCode::new(zip).is_some()
}

/// True iff `s` is a calendar-valid `MM/DD/YYYY` date.
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Parse a `MM/DD/YYYY` date.
///
/// The year must be written with exactly four digits and the input must carry no surrounding
/// whitespace; chrono alone would read `01/04/21` as the year 21.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let four_digit_year = s
        .rsplit_once('/')
        .is_some_and(|(_, year)| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));
    if !four_digit_year || s.trim() != s {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
