//! Scope resolution: which records a principal may view or edit.

use serde::Serialize;

use super::Principal;
use crate::error::AccessError;
use crate::model::{Batchmate, EngineeringField};

/// The set of records visible to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum AccessScope {
    /// No principal: nothing is visible.
    Nothing,
    /// Every record is visible.
    All,
    /// Only records of one field are visible.
    Field(EngineeringField),
}

impl AccessScope {
    /// Whether a record falls inside this scope.
    pub fn matches(&self, record: &Batchmate) -> bool {
        self.allows_field(record.field)
    }

    /// Whether records of `field` fall inside this scope.
    pub fn allows_field(&self, field: EngineeringField) -> bool {
        match self {
            AccessScope::Nothing => false,
            AccessScope::All => true,
            AccessScope::Field(scoped) => *scoped == field,
        }
    }

    /// Field a backend query can be narrowed to, if the scope has one.
    pub fn pushdown_field(&self) -> Option<EngineeringField> {
        match self {
            AccessScope::Field(field) => Some(*field),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AccessScope::Nothing)
    }
}

/// Resolve the scope for an optional principal.
///
/// An absent principal resolves to [`AccessScope::Nothing`], never to all
/// records.
pub fn resolve_scope(principal: Option<&Principal>) -> AccessScope {
    match principal {
        None => AccessScope::Nothing,
        Some(Principal::SuperAdmin) => AccessScope::All,
        Some(Principal::FieldAdmin { assigned_field }) => AccessScope::Field(*assigned_field),
    }
}

/// Whether a principal may edit a record.
pub fn can_edit(principal: &Principal, record: &Batchmate) -> bool {
    resolve_scope(Some(principal)).matches(record)
}

/// Reject a write that touches records of `field` outside the principal's scope.
pub fn authorize_write(
    principal: Option<&Principal>,
    field: EngineeringField,
) -> Result<(), AccessError> {
    let principal = principal.ok_or(AccessError::Unauthenticated)?;
    if resolve_scope(Some(principal)).allows_field(field) {
        Ok(())
    } else {
        tracing::debug!(%principal, %field, "write outside scope rejected");
        Err(AccessError::Forbidden(format!(
            "{} records are outside your assigned field",
            field
        )))
    }
}
