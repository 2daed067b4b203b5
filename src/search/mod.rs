//! Filter and search over batchmate records.
//!
//! The engine never fetches. It takes a candidate set that is already in
//! memory, narrows it to the caller's [`AccessScope`](crate::acl::AccessScope),
//! and then ANDs together:
//!
//! - an optional free-text query, matched case-insensitively as a substring
//!   of the calling name, full name, email or nick name;
//! - every present [`FilterCriteria`] key: substring for text keys, exact
//!   equality for `country` and `field`.
//!
//! ```text
//! records ──> scope ──> free text ──> criteria ──> ordered results
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use alumni_hub::acl::{resolve_scope, Principal};
//! use alumni_hub::search::{search, FilterCriteria};
//!
//! let scope = resolve_scope(Some(&principal));
//! let criteria = FilterCriteria::new().with_country("UK");
//! let hits = search(&records, &scope, &criteria, Some("lee"));
//! ```

mod criteria;
mod engine;

pub use criteria::{CriteriaKey, FilterCriteria};
pub use engine::{search, search_owned};
