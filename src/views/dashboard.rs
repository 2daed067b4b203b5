//! Overview numbers for the dashboard landing page.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{available_countries, by_recency, distinct_workplaces, field_counts};
use crate::acl::AccessScope;
use crate::model::{Batchmate, EngineeringField};
use crate::search::{search, FilterCriteria};

/// Record count for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldCount {
    pub field: EngineeringField,
    pub count: usize,
}

/// Compact row for the "recently added" panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBatchmate {
    pub id: String,
    pub calling_name: String,
    pub full_name: String,
    pub field: EngineeringField,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Batchmate> for RecentBatchmate {
    fn from(record: &Batchmate) -> Self {
        Self {
            id: record.key().to_string(),
            calling_name: record.calling_name.clone(),
            full_name: record.full_name.clone(),
            field: record.field,
            country: record.country.clone(),
            created_at: record.created_at,
        }
    }
}

/// Dashboard statistics for one principal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Records inside the principal's scope.
    pub total_alumni: usize,
    /// Distinct countries among accessible records.
    pub countries: usize,
    /// Distinct working places among accessible records.
    pub workplaces: usize,
    /// Per-field counts over the whole directory.
    pub field_counts: Vec<FieldCount>,
    /// Most recently created accessible records.
    pub recent: Vec<RecentBatchmate>,
}

impl DashboardStats {
    /// Compute the dashboard from the full record set.
    pub fn compute(all: &[Batchmate], scope: &AccessScope, recent_limit: usize) -> Self {
        let accessible = search(all, scope, &FilterCriteria::default(), None);

        let recent = by_recency(accessible.clone())
            .into_iter()
            .take(recent_limit)
            .map(RecentBatchmate::from)
            .collect();

        Self {
            total_alumni: accessible.len(),
            countries: available_countries(accessible.iter().copied()).len(),
            workplaces: distinct_workplaces(accessible.iter().copied()),
            field_counts: field_counts(all),
            recent,
        }
    }

    /// Largest per-field count, used to scale the bar chart.
    pub fn max_field_count(&self) -> usize {
        self.field_counts.iter().map(|c| c.count).max().unwrap_or(0)
    }
}
