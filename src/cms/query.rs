//! Strapi REST query parameters.

use crate::acl::AccessScope;
use crate::model::Batchmate;
use crate::search::{search, CriteriaKey, FilterCriteria};

/// Media relations requested with every batchmate read.
const POPULATE: [&str; 2] = ["universityPhoto", "currentPhoto"];

/// Filters pushed down to the CMS when listing batchmates.
///
/// Backends must apply these with the same semantics as the in-memory
/// engine; results are re-checked in memory regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmsFilters {
    pub criteria: FilterCriteria,
}

impl CmsFilters {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria: criteria.normalized(),
        }
    }

    /// Narrow by the scope's field when the criteria leave field open.
    pub fn scoped(criteria: FilterCriteria, scope: &AccessScope) -> Self {
        let mut filters = Self::new(criteria);
        if filters.criteria.field.is_none() {
            if let Some(field) = scope.pushdown_field() {
                filters.criteria = filters.criteria.with_field(field);
            }
        }
        filters
    }

    /// Whether a record passes these filters.
    pub fn matches(&self, record: &Batchmate) -> bool {
        !search(
            std::slice::from_ref(record),
            &AccessScope::All,
            &self.criteria,
            None,
        )
        .is_empty()
    }

    /// `filters[...]` query pairs.
    pub fn params(&self) -> Vec<(String, String)> {
        self.criteria
            .active()
            .map(|(key, value)| {
                (
                    format!("filters[{}][{}]", key.attribute(), operator(key)),
                    value.to_string(),
                )
            })
            .collect()
    }
}

/// Strapi filter operator used for a key.
///
/// Text keys, phones included, match case-insensitively, as in the
/// in-memory engine.
pub fn operator(key: CriteriaKey) -> &'static str {
    if key.is_enumerated() {
        "$eq"
    } else {
        "$containsi"
    }
}

/// `populate[i]` pairs for the photo relations.
pub fn populate_params() -> Vec<(String, String)> {
    POPULATE
        .iter()
        .enumerate()
        .map(|(i, relation)| (format!("populate[{}]", i), relation.to_string()))
        .collect()
}

pub fn pagination_params(page: usize, page_size: usize) -> Vec<(String, String)> {
    vec![
        ("pagination[page]".to_string(), page.to_string()),
        ("pagination[pageSize]".to_string(), page_size.to_string()),
    ]
}
