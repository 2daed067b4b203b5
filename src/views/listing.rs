//! Directory listing and per-field browsing.

use serde::{Deserialize, Serialize};

use super::{available_countries, field_counts, preview, FieldCount, Preview};
use crate::acl::{can_edit, resolve_scope, AccessScope, Principal};
use crate::model::{Batchmate, EngineeringField};
use crate::search::{search, FilterCriteria};

/// Filters offered by the directory listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingQuery {
    /// Matched against calling name, full name, email and nick name.
    pub free_text: Option<String>,
    #[serde(flatten)]
    pub criteria: FilterCriteria,
}

impl ListingQuery {
    /// Read `q` and any criteria key from query-string pairs.
    pub fn from_params<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let free_text = pairs
            .iter()
            .find(|(name, _)| *name == "q")
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Self {
            free_text,
            criteria: FilterCriteria::from_form(pairs),
        }
    }
}

/// One row of the listing table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    #[serde(flatten)]
    pub record: Batchmate,
    /// Whether the edit action is rendered for this row.
    pub can_edit: bool,
}

/// Result of the listing page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub results: Preview<ListingRow>,
    /// Country choices from the principal's accessible records.
    pub countries: Vec<String>,
}

impl Listing {
    /// Build the listing for a principal over the fetched records.
    pub fn build(
        all: &[Batchmate],
        principal: Option<&Principal>,
        query: &ListingQuery,
        limit: usize,
    ) -> Self {
        let scope = resolve_scope(principal);
        let accessible = search(all, &scope, &FilterCriteria::default(), None);
        let criteria = query.criteria.clone().normalized();
        let hits = search(all, &scope, &criteria, query.free_text.as_deref());

        let rows: Vec<ListingRow> = hits
            .into_iter()
            .map(|record| ListingRow {
                record: record.clone(),
                can_edit: principal.is_some_and(|p| can_edit(p, record)),
            })
            .collect();

        Self {
            results: preview(&rows, limit),
            countries: available_countries(accessible),
        }
    }
}

/// Records of one field, browsed with the advanced filters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullView {
    pub field: EngineeringField,
    pub results: Vec<Batchmate>,
    /// Countries present among this field's records.
    pub countries: Vec<String>,
    /// Counts shown on the field tabs.
    pub tabs: Vec<FieldCount>,
}

/// Build the per-field view. `active_field` overrides any field criterion.
pub fn full_view(
    all: &[Batchmate],
    scope: &AccessScope,
    active_field: EngineeringField,
    criteria: &FilterCriteria,
) -> FullView {
    let field_only = FilterCriteria::new().with_field(active_field);
    let in_field = search(all, scope, &field_only, None);

    let mut narrowed = criteria.clone().normalized();
    narrowed.field = Some(active_field.as_str().to_string());

    FullView {
        field: active_field,
        results: search(all, scope, &narrowed, None)
            .into_iter()
            .cloned()
            .collect(),
        countries: available_countries(in_field),
        tabs: field_counts(search(all, scope, &FilterCriteria::default(), None)),
    }
}
