//! Presentation of query results.
//!
//! Reports are plain data (serializable with `serde`) plus a [`fmt::Display`] rendering that
//! matches the analyzer's text output.

use std::fmt;

use serde::Serialize;

use crate::processing::{
    filter_rows, modality_breakdown, percentage_of, ModalityBreakdown, ModalityCounts,
};
use crate::types::{DataSet, Modality, ReportingWeek, Row, StateFilter};

const RULE: &str = "-------------------------------";

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage with one decimal (`"83.3%"`), or `"n/a"` when `whole` is zero.
pub fn format_percentage(part: u64, whole: u64) -> String {
    match percentage_of(part, whole) {
        Ok(share) => format!("{:.1}%", share * 100.0),
        Err(_) => "n/a".to_string(),
    }
}

/// Totals and per-modality breakdown for one state (or all states) in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateReport {
    pub state: StateFilter,
    pub week: ReportingWeek,
    pub totals: ModalityCounts,
    pub modalities: ModalityBreakdown,
}

impl StateReport {
    pub fn build(dataset: &DataSet, state: StateFilter, week: ReportingWeek) -> Self {
        let rows = filter_rows(dataset, &state, week, None);
        Self {
            state,
            week,
            totals: ModalityCounts::from_rows(&rows),
            modalities: modality_breakdown(dataset, &state, week),
        }
    }

    fn write_section(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        whole: u64,
        pick: fn(ModalityCounts) -> u64,
    ) -> fmt::Result {
        writeln!(f, "{title}")?;
        for (modality, counts) in self.modalities.iter() {
            let count = pick(counts);
            writeln!(
                f,
                " * {} ({}) {modality}",
                format_thousands(count),
                format_percentage(count, whole)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for StateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Date: {}", self.week)?;
        writeln!(f, "Description: {}", self.state)?;
        writeln!(f, "{} schools", format_thousands(self.totals.schools))?;
        writeln!(f, "{} students", format_thousands(self.totals.students))?;
        self.write_section(f, "Schools per modality:", self.totals.schools, |c| c.schools)?;
        self.write_section(f, "Students per modality:", self.totals.students, |c| c.students)?;
        write!(f, "{RULE}")
    }
}

/// One district's record for a zip code and week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictReport {
    pub district_id: u64,
    pub district_name: String,
    pub week: ReportingWeek,
    pub modality: Modality,
    pub operational_schools: u64,
    pub student_count: u64,
    pub city: String,
    pub state: String,
    pub zip_code: u32,
    /// Matching rows that were not reported (only the first match is shown).
    pub extra_matches: usize,
}

impl DistrictReport {
    /// Report the first of `rows`; `None` when there are no rows.
    pub fn from_rows(rows: &[&Row]) -> Option<Self> {
        let (first, rest) = rows.split_first()?;
        Some(Self {
            district_id: first.district_id,
            district_name: first.district_name.clone(),
            week: first.week,
            modality: first.modality,
            operational_schools: first.operational_schools,
            student_count: first.student_count,
            city: first.city.clone(),
            state: first.state.clone(),
            zip_code: first.zip_code,
            extra_matches: rest.len(),
        })
    }
}

impl fmt::Display for DistrictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "District NCES ID: {:07}", self.district_id)?;
        writeln!(f, "School name: {}", self.district_name)?;
        writeln!(f, "Date: {}", self.week)?;
        writeln!(f, "Learning Mode: {}", self.modality)?;
        writeln!(f, "Number of schools: {}", self.operational_schools)?;
        writeln!(f, "Number of students: {}", self.student_count)?;
        writeln!(f, "City: {}", self.city)?;
        writeln!(f, "State: {}", self.state)?;
        write!(f, "Zip Code: {}", self.zip_code)?;
        if self.extra_matches > 0 {
            write!(
                f,
                "\nNote: {} more record(s) share this zip code and date; showing the first.",
                self.extra_matches
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn w1() -> ReportingWeek {
        ReportingWeek::from_date(NaiveDate::from_ymd_opt(2021, 1, 4).unwrap())
    }

    fn row(id: u64, modality: Modality, schools: u64, students: u64) -> Row {
        Row {
            district_id: id,
            district_name: format!("District {id}"),
            week: w1(),
            modality,
            operational_schools: schools,
            student_count: students,
            city: "Fresno".to_string(),
            state: "CA".to_string(),
            zip_code: 93701,
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn percentages_guard_zero_totals() {
        assert_eq!(format_percentage(100, 120), "83.3%");
        assert_eq!(format_percentage(0, 0), "n/a");
    }

    #[test]
    fn state_report_renders_breakdown() {
        let ds = DataSet::new(vec![
            row(1, Modality::InPerson, 100, 5000),
            row(2, Modality::Remote, 20, 800),
        ]);
        let report = StateReport::build(&ds, StateFilter::parse("CA").unwrap(), w1());
        let text = report.to_string();

        assert!(text.contains("Date: 01/04/2021"));
        assert!(text.contains("Description: CA"));
        assert!(text.contains("120 schools"));
        assert!(text.contains("5,800 students"));
        assert!(text.contains(" * 100 (83.3%) In Person"));
        assert!(text.contains(" * 0 (0.0%) Hybrid"));
        assert!(text.contains(" * 800 (13.8%) Remote"));
    }

    #[test]
    fn state_report_for_empty_week_prints_not_applicable() {
        let report = StateReport::build(&DataSet::default(), StateFilter::All, w1());
        let text = report.to_string();
        assert!(text.contains("Description: ALL"));
        assert!(text.contains("0 schools"));
        assert!(text.contains(" * 0 (n/a) Hybrid"));
    }

    #[test]
    fn district_report_uses_first_match() {
        let a = row(42, Modality::Hybrid, 3, 900);
        let b = row(43, Modality::Remote, 1, 50);
        let report = DistrictReport::from_rows(&[&a, &b]).unwrap();

        assert_eq!(report.district_id, 42);
        assert_eq!(report.extra_matches, 1);
        let text = report.to_string();
        assert!(text.starts_with("District NCES ID: 0000042\n"));
        assert!(text.contains("Learning Mode: Hybrid"));
        assert!(text.contains("1 more record(s)"));
    }

    #[test]
    fn district_report_none_without_rows() {
        assert!(DistrictReport::from_rows(&[]).is_none());
    }
}
