//! Aggregations over filtered rows.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::types::{DataSet, Modality, ReportingWeek, Row, StateFilter};

use super::filter::filter_rows;

/// Total `operational_schools` over `rows` (0 for an empty slice).
pub fn sum_schools(rows: &[&Row]) -> u64 {
    rows.iter().map(|row| row.operational_schools).sum()
}

/// Total `student_count` over `rows` (0 for an empty slice).
pub fn sum_students(rows: &[&Row]) -> u64 {
    rows.iter().map(|row| row.student_count).sum()
}

/// `part / whole` as a fraction (not multiplied by 100).
///
/// A zero `whole` is a legitimate dataset state (a week with nothing reported), so callers
/// must handle [`QueryError::DivisionByZero`] rather than treat it as a bug.
pub fn percentage_of(part: u64, whole: u64) -> QueryResult<f64> {
    if whole == 0 {
        return Err(QueryError::DivisionByZero { part });
    }
    Ok(part as f64 / whole as f64)
}

/// School and student totals for one slice of the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModalityCounts {
    pub schools: u64,
    pub students: u64,
}

impl ModalityCounts {
    pub fn from_rows(rows: &[&Row]) -> Self {
        Self {
            schools: sum_schools(rows),
            students: sum_students(rows),
        }
    }
}

/// Per-modality totals. Always holds exactly one entry per [`Modality`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModalityBreakdown(BTreeMap<Modality, ModalityCounts>);

impl ModalityBreakdown {
    pub fn get(&self, modality: Modality) -> ModalityCounts {
        self.0.get(&modality).copied().unwrap_or_default()
    }

    /// Entries in report order (In Person, Hybrid, Remote).
    pub fn iter(&self) -> impl Iterator<Item = (Modality, ModalityCounts)> + '_ {
        self.0.iter().map(|(m, c)| (*m, *c))
    }

    /// Sum of the per-modality counts.
    pub fn total(&self) -> ModalityCounts {
        self.0.values().fold(ModalityCounts::default(), |acc, c| ModalityCounts {
            schools: acc.schools + c.schools,
            students: acc.students + c.students,
        })
    }
}

impl Index<Modality> for ModalityBreakdown {
    type Output = ModalityCounts;

    fn index(&self, modality: Modality) -> &Self::Output {
        &self.0[&modality]
    }
}

/// School/student totals for each modality for `state` in `week`.
///
/// Each modality runs its own query against the full dataset.
pub fn modality_breakdown(
    dataset: &DataSet,
    state: &StateFilter,
    week: ReportingWeek,
) -> ModalityBreakdown {
    let counts = Modality::ALL
        .into_iter()
        .map(|modality| {
            let rows = filter_rows(dataset, state, week, Some(modality));
            (modality, ModalityCounts::from_rows(&rows))
        })
        .collect();
    ModalityBreakdown(counts)
}
