//! View-level computations built on the search engine.
//!
//! Each dashboard page (overview, listing, per-field full view, reports)
//! reduces to a pure function over the engine's output. Ordering and slicing
//! are explicit steps applied after the engine runs.

mod buffer;
mod dashboard;
mod listing;
mod reports;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Batchmate, EngineeringField};

pub use buffer::{CandidateBuffer, FetchToken};
pub use dashboard::{DashboardStats, FieldCount, RecentBatchmate};
pub use listing::{full_view, FullView, Listing, ListingQuery, ListingRow};
pub use reports::{CountryCount, Report, ReportRequest};

/// Distinct non-empty countries in `records`, sorted ascending.
pub fn available_countries<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Batchmate>,
{
    distinct_non_empty(records.into_iter().map(|r| r.country.as_deref()))
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Number of distinct non-empty working places in `records`.
pub fn distinct_workplaces<'a, I>(records: I) -> usize
where
    I: IntoIterator<Item = &'a Batchmate>,
{
    distinct_non_empty(records.into_iter().map(|r| r.working_place.as_deref())).len()
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeSet<&'a str> {
    values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .collect()
}

/// Record count for every field, in enumeration order, zero counts included.
pub fn field_counts<'a, I>(records: I) -> Vec<FieldCount>
where
    I: IntoIterator<Item = &'a Batchmate>,
{
    let mut counts = [0usize; EngineeringField::ALL.len()];
    for record in records {
        if let Some(idx) = EngineeringField::ALL.iter().position(|f| *f == record.field) {
            counts[idx] += 1;
        }
    }
    EngineeringField::ALL
        .into_iter()
        .zip(counts)
        .map(|(field, count)| FieldCount { field, count })
        .collect()
}

/// Sort by `created_at`, newest first. Ties keep their input order.
pub fn by_recency<'a>(mut records: Vec<&'a Batchmate>) -> Vec<&'a Batchmate> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

/// A bounded slice of a result set together with its full size.
#[derive(Debug, Clone, Serialize)]
pub struct Preview<T> {
    pub rows: Vec<T>,
    pub total: usize,
}

impl<T> Preview<T> {
    /// Whether rows were cut off.
    pub fn is_truncated(&self) -> bool {
        self.total > self.rows.len()
    }

    /// Footer text shown under a truncated table.
    pub fn summary(&self) -> Option<String> {
        self.is_truncated()
            .then(|| format!("Showing {} of {} records", self.rows.len(), self.total))
    }
}

/// Keep the first `limit` rows.
pub fn preview<T: Clone>(rows: &[T], limit: usize) -> Preview<T> {
    Preview {
        rows: rows.iter().take(limit).cloned().collect(),
        total: rows.len(),
    }
}
