//! Row filtering: the query engine.

use std::collections::BTreeSet;

use crate::types::{DataSet, Modality, ReportingWeek, Row, StateFilter, ZipCode};

/// Rows reported for `week`, restricted to `state` (unless [`StateFilter::All`]) and, when
/// given, to a single `modality`.
///
/// Matching is exact on every key. An unknown week or state yields an empty vector.
pub fn filter_rows<'a>(
    dataset: &'a DataSet,
    state: &StateFilter,
    week: ReportingWeek,
    modality: Option<Modality>,
) -> Vec<&'a Row> {
    let rows = dataset.select(|row| {
        row.week == week
            && state.matches(&row.state)
            && modality.is_none_or(|m| row.modality == m)
    });
    tracing::debug!(%state, %week, ?modality, matched = rows.len(), "filter_rows");
    rows
}

/// Rows for one zip code and `week`.
///
/// The source has one district per zip code, but nothing enforces it: every match is
/// returned, in dataset order.
pub fn filter_by_zip(dataset: &DataSet, zip: ZipCode, week: ReportingWeek) -> Vec<&Row> {
    let rows = dataset.select(|row| row.zip_code == zip.get() && row.week == week);
    tracing::debug!(%zip, %week, matched = rows.len(), "filter_by_zip");
    rows
}

/// Distinct reporting weeks present in the dataset, newest first.
pub fn available_weeks(dataset: &DataSet) -> Vec<ReportingWeek> {
    let weeks: BTreeSet<ReportingWeek> = dataset.rows().iter().map(|row| row.week).collect();
    weeks.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateCode;
    use chrono::NaiveDate;

    fn week(y: i32, m: u32, d: u32) -> ReportingWeek {
        ReportingWeek::from_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn row(state: &str, zip: u32, week: ReportingWeek, modality: Modality, schools: u64) -> Row {
        Row {
            district_id: u64::from(zip),
            district_name: format!("{state} {zip}"),
            week,
            modality,
            operational_schools: schools,
            student_count: schools * 10,
            city: "Springfield".to_string(),
            state: state.to_string(),
            zip_code: zip,
        }
    }

    fn sample_dataset() -> DataSet {
        let w1 = week(2021, 1, 4);
        let w2 = week(2021, 1, 11);
        DataSet::new(vec![
            row("CA", 90001, w1, Modality::InPerson, 3),
            row("TX", 73301, w1, Modality::Remote, 5),
            row("CA", 90002, w1, Modality::Hybrid, 7),
            row("CA", 90001, w2, Modality::Remote, 2),
        ])
    }

    fn ca() -> StateFilter {
        StateFilter::State(StateCode::parse("CA").unwrap())
    }

    #[test]
    fn filter_rows_restricts_by_state_and_week() {
        let ds = sample_dataset();
        let out = filter_rows(&ds, &ca(), week(2021, 1, 4), None);
        let zips: Vec<u32> = out.iter().map(|r| r.zip_code).collect();
        assert_eq!(zips, vec![90001, 90002]);
    }

    #[test]
    fn filter_rows_all_keeps_every_state_in_order() {
        let ds = sample_dataset();
        let out = filter_rows(&ds, &StateFilter::All, week(2021, 1, 4), None);
        let zips: Vec<u32> = out.iter().map(|r| r.zip_code).collect();
        assert_eq!(zips, vec![90001, 73301, 90002]);
    }

    #[test]
    fn filter_rows_restricts_by_modality() {
        let ds = sample_dataset();
        let out = filter_rows(&ds, &ca(), week(2021, 1, 4), Some(Modality::Hybrid));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].zip_code, 90002);
    }

    #[test]
    fn filter_rows_unknown_week_is_empty() {
        let ds = sample_dataset();
        assert!(filter_rows(&ds, &StateFilter::All, week(2020, 3, 1), None).is_empty());
    }

    #[test]
    fn filter_by_zip_returns_every_match() {
        let mut rows = sample_dataset().rows().to_vec();
        rows.push(row("CA", 90001, week(2021, 1, 4), Modality::Hybrid, 1));
        let ds = DataSet::new(rows);

        let out = filter_by_zip(&ds, ZipCode::new(90001).unwrap(), week(2021, 1, 4));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].modality, Modality::InPerson);
        assert_eq!(out[1].modality, Modality::Hybrid);
    }

    #[test]
    fn available_weeks_are_distinct_and_newest_first() {
        let ds = sample_dataset();
        assert_eq!(available_weeks(&ds), vec![week(2021, 1, 11), week(2021, 1, 4)]);
        assert!(available_weeks(&DataSet::default()).is_empty());
    }
}
