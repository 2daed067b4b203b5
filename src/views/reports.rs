//! Field and country reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{available_countries, field_counts, preview, FieldCount, Preview};
use crate::acl::AccessScope;
use crate::model::{Batchmate, EngineeringField};
use crate::search::{search, FilterCriteria};

/// What a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportRequest {
    /// Records of the selected fields; an empty selection means every
    /// accessible record.
    ByFields {
        #[serde(default)]
        fields: Vec<EngineeringField>,
    },
    /// Records from one country.
    ByCountry { country: String },
}

impl ReportRequest {
    /// Heading describing the selection.
    pub fn title(&self) -> String {
        match self {
            ReportRequest::ByFields { fields } if fields.is_empty() => "Fields: All".to_string(),
            ReportRequest::ByFields { fields } => {
                let names: Vec<&str> = fields.iter().map(EngineeringField::as_str).collect();
                format!("Fields: {}", names.join(", "))
            }
            ReportRequest::ByCountry { country } => format!("Country: {}", country),
        }
    }
}

/// Record count for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// A generated report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub rows: Vec<Batchmate>,
    /// Per-field counts over the accessible records.
    pub field_stats: Vec<FieldCount>,
    /// Country counts over the accessible records, largest first.
    pub country_stats: Vec<CountryCount>,
}

impl Report {
    /// Generate a report over the principal's accessible records.
    ///
    /// Country stats take the first `country_stats_limit` countries in
    /// alphabetical order and then rank them by count.
    pub fn generate(
        all: &[Batchmate],
        scope: &AccessScope,
        request: &ReportRequest,
        country_stats_limit: usize,
    ) -> Self {
        let accessible = search(all, scope, &FilterCriteria::default(), None);

        let rows: Vec<Batchmate> = match request {
            ReportRequest::ByFields { fields } => accessible
                .iter()
                .filter(|r| fields.is_empty() || fields.contains(&r.field))
                .map(|r| (*r).clone())
                .collect(),
            ReportRequest::ByCountry { country } => {
                let criteria = FilterCriteria::new().with_country(country.clone());
                search(all, scope, &criteria, None)
                    .into_iter()
                    .cloned()
                    .collect()
            }
        };

        let mut per_country: HashMap<&str, usize> = HashMap::new();
        for record in &accessible {
            if let Some(country) = record.country.as_deref() {
                *per_country.entry(country).or_default() += 1;
            }
        }

        let mut country_stats: Vec<CountryCount> = available_countries(accessible.iter().copied())
            .into_iter()
            .take(country_stats_limit)
            .map(|country| {
                let count = per_country.get(country.as_str()).copied().unwrap_or(0);
                CountryCount { country, count }
            })
            .collect();
        country_stats.sort_by(|a, b| b.count.cmp(&a.count));

        tracing::debug!(title = %request.title(), rows = rows.len(), "report generated");

        Self {
            title: request.title(),
            rows,
            field_stats: field_counts(accessible),
            country_stats,
        }
    }

    /// First `limit` rows for the on-screen preview.
    pub fn preview(&self, limit: usize) -> Preview<Batchmate> {
        preview(&self.rows, limit)
    }
}
