//! CSV ingestion of the learning-modality export.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Modality, ReportingWeek, Row};

/// Column names the loader requires, in source order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "district_nces_id",
    "district_name",
    "week",
    "learning_modality",
    "operational_schools",
    "student_count",
    "city",
    "state",
    "zip_code",
];

const DISTRICT_ID: usize = 0;
const DISTRICT_NAME: usize = 1;
const WEEK: usize = 2;
const MODALITY: usize = 3;
const SCHOOLS: usize = 4;
const STUDENTS: usize = 5;
const CITY: usize = 6;
const STATE: usize = 7;
const ZIP: usize = 8;

/// Ingest a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain every name in [`REQUIRED_COLUMNS`] (order can differ, extras are
///   ignored).
/// - Each value is parsed into its [`Row`] field type; `week` is parsed once here into a
///   [`ReportingWeek`].
/// - Blank school/student counts load as 0.
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let col_idxs = column_indexes(&headers)?;

    let mut rows: Vec<Row> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        let cell = |i: usize| record.get(col_idxs[i]).unwrap_or("").trim();

        let week_raw = cell(WEEK);
        let week = ReportingWeek::parse_timestamp(week_raw)
            .map_err(|e| parse_error(user_row, WEEK, week_raw, e))?;

        let modality_raw = cell(MODALITY);
        let modality = modality_raw
            .parse::<Modality>()
            .map_err(|e| parse_error(user_row, MODALITY, modality_raw, e))?;

        rows.push(Row {
            district_id: parse_number(user_row, DISTRICT_ID, cell(DISTRICT_ID))?,
            district_name: cell(DISTRICT_NAME).to_owned(),
            week,
            modality,
            operational_schools: parse_count(user_row, SCHOOLS, cell(SCHOOLS))?,
            student_count: parse_count(user_row, STUDENTS, cell(STUDENTS))?,
            city: cell(CITY).to_owned(),
            state: cell(STATE).to_owned(),
            zip_code: parse_number(user_row, ZIP, cell(ZIP))?,
        });
    }

    Ok(DataSet::new(rows))
}

/// Returns `true` if `path` is a readable CSV whose header has every required column.
pub fn has_required_columns(path: impl AsRef<Path>) -> bool {
    let Ok(mut rdr) = csv::ReaderBuilder::new().has_headers(true).from_path(path) else {
        return false;
    };
    match rdr.headers() {
        Ok(headers) => column_indexes(headers).is_ok(),
        Err(_) => false,
    }
}

// Map required columns -> CSV column indexes (allows re-ordered CSV columns).
fn column_indexes(headers: &csv::StringRecord) -> IngestionResult<Vec<usize>> {
    REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{name}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>()
                    ),
                })
        })
        .collect()
}

fn parse_number<T>(row: usize, column: usize, raw: &str) -> IngestionResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| parse_error(row, column, raw, e))
}

fn parse_count(row: usize, column: usize, raw: &str) -> IngestionResult<u64> {
    if raw.is_empty() {
        return Ok(0);
    }
    // Counts are integral but some exports write them as floats (e.g. "12.0").
    match raw.parse::<u64>() {
        Ok(v) => Ok(v),
        Err(int_err) => match raw.parse::<f64>() {
            Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
            _ => Err(parse_error(row, column, raw, int_err)),
        },
    }
}

fn parse_error(row: usize, column: usize, raw: &str, message: impl Display) -> IngestionError {
    IngestionError::ParseError {
        row,
        column: REQUIRED_COLUMNS[column].to_owned(),
        raw: raw.to_owned(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes())
    }

    const HEADER: &str = "district_nces_id,district_name,week,learning_modality,operational_schools,student_count,city,state,zip_code";

    #[test]
    fn parses_counts_and_blank_counts() {
        assert_eq!(parse_count(2, SCHOOLS, "12").unwrap(), 12);
        assert_eq!(parse_count(2, SCHOOLS, "12.0").unwrap(), 12);
        assert_eq!(parse_count(2, SCHOOLS, "").unwrap(), 0);
        assert!(parse_count(2, SCHOOLS, "-1").is_err());
        assert!(parse_count(2, SCHOOLS, "1.5").is_err());
    }

    #[test]
    fn blank_student_count_loads_as_zero() {
        let input = format!(
            "{HEADER}\n0100001,Alpha District,01/04/2021 12:00:00 AM,Hybrid,4,,Montgomery,AL,36104\n"
        );
        let ds = ingest_csv_from_reader(&mut reader(&input)).unwrap();
        assert_eq!(ds.rows()[0].student_count, 0);
        assert_eq!(ds.rows()[0].operational_schools, 4);
        assert_eq!(ds.rows()[0].district_id, 100001);
    }

    #[test]
    fn unknown_modality_reports_column() {
        let input = format!(
            "{HEADER}\n1,Alpha,01/04/2021 12:00:00 AM,Blended,4,10,Montgomery,AL,36104\n"
        );
        let err = ingest_csv_from_reader(&mut reader(&input)).unwrap_err();
        match err {
            IngestionError::ParseError { row, column, raw, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "learning_modality");
                assert_eq!(raw, "Blended");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_week_is_a_parse_error() {
        let input = format!("{HEADER}\n1,Alpha,2021-01-04,Hybrid,4,10,Montgomery,AL,36104\n");
        let err = ingest_csv_from_reader(&mut reader(&input)).unwrap_err();
        assert!(err.to_string().contains("column 'week'"));
    }
}
