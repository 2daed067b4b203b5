//! Conjunctive filter/search over an in-memory candidate set.

use crate::acl::AccessScope;
use crate::model::Batchmate;

use super::criteria::{CriteriaKey, FilterCriteria};

/// Run a search over `records`.
///
/// A record is returned when it is inside `scope`, matches the optional
/// free-text query, and satisfies every present criterion. Output keeps the
/// input order. Absent optional attributes never match a present filter.
pub fn search<'a>(
    records: &'a [Batchmate],
    scope: &AccessScope,
    criteria: &FilterCriteria,
    free_text: Option<&str>,
) -> Vec<&'a Batchmate> {
    let query = CompiledQuery::new(criteria, free_text);
    records
        .iter()
        .filter(|record| scope.matches(record) && query.matches(record))
        .collect()
}

/// Same as [`search`], cloning the matching records.
pub fn search_owned(
    records: &[Batchmate],
    scope: &AccessScope,
    criteria: &FilterCriteria,
    free_text: Option<&str>,
) -> Vec<Batchmate> {
    search(records, scope, criteria, free_text)
        .into_iter()
        .cloned()
        .collect()
}

/// Criteria with text needles lowercased once per search.
struct CompiledQuery<'c> {
    free_text: Option<String>,
    text: Vec<(CriteriaKey, String)>,
    exact: Vec<(CriteriaKey, &'c str)>,
}

impl<'c> CompiledQuery<'c> {
    fn new(criteria: &'c FilterCriteria, free_text: Option<&str>) -> Self {
        let mut text = Vec::new();
        let mut exact = Vec::new();
        for (key, value) in criteria.active() {
            if key.is_enumerated() {
                exact.push((key, value));
            } else {
                text.push((key, value.to_lowercase()));
            }
        }

        Self {
            free_text: free_text
                .filter(|q| !q.trim().is_empty())
                .map(str::to_lowercase),
            text,
            exact,
        }
    }

    fn matches(&self, record: &Batchmate) -> bool {
        if let Some(ref needle) = self.free_text {
            let hit = contains_folded(&record.calling_name, needle)
                || contains_folded(&record.full_name, needle)
                || contains_folded(&record.email, needle)
                || record
                    .nick_name
                    .as_deref()
                    .is_some_and(|nick| contains_folded(nick, needle));
            if !hit {
                return false;
            }
        }

        let text_ok = self.text.iter().all(|(key, needle)| {
            text_attribute(record, *key).is_some_and(|value| contains_folded(value, needle))
        });

        text_ok
            && self
                .exact
                .iter()
                .all(|(key, expected)| exact_attribute(record, *key) == Some(*expected))
    }
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn text_attribute(record: &Batchmate, key: CriteriaKey) -> Option<&str> {
    match key {
        CriteriaKey::CallingName => Some(&record.calling_name),
        CriteriaKey::FullName => Some(&record.full_name),
        CriteriaKey::NickName => record.nick_name.as_deref(),
        CriteriaKey::WorkingPlace => record.working_place.as_deref(),
        CriteriaKey::WhatsappMobile => Some(&record.whatsapp_mobile),
        CriteriaKey::Mobile => record.mobile.as_deref(),
        CriteriaKey::Country | CriteriaKey::Field => None,
    }
}

fn exact_attribute(record: &Batchmate, key: CriteriaKey) -> Option<&str> {
    match key {
        CriteriaKey::Country => record.country.as_deref(),
        CriteriaKey::Field => Some(record.field.as_str()),
        _ => None,
    }
}
