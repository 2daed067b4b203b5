//! Access control for the alumni directory.
//!
//! A principal is either a super admin, who sees and edits every record, or
//! a field admin bound to exactly one engineering field.

mod scope;

use serde::{Deserialize, Serialize};

use crate::model::EngineeringField;

pub use scope::{authorize_write, can_edit, resolve_scope, AccessScope};

/// Role names as they appear in configuration and CMS role types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    FieldAdmin,
}

impl Role {
    /// Parse a role name such as `super_admin`, `Super Admin` or `field-admin`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "super_admin" | "superadmin" => Some(Role::SuperAdmin),
            "field_admin" | "fieldadmin" => Some(Role::FieldAdmin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::SuperAdmin => write!(f, "super_admin"),
            Role::FieldAdmin => write!(f, "field_admin"),
        }
    }
}

/// The authenticated actor.
///
/// A field admin always carries its assigned field; a super admin has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    SuperAdmin,
    FieldAdmin {
        #[serde(rename = "assignedField")]
        assigned_field: EngineeringField,
    },
}

impl Principal {
    /// Build a principal from a role and an optional field, checking that the
    /// field is present exactly when the role needs one.
    pub fn from_parts(
        role: Role,
        assigned_field: Option<EngineeringField>,
    ) -> std::result::Result<Self, String> {
        match (role, assigned_field) {
            (Role::SuperAdmin, None) => Ok(Principal::SuperAdmin),
            (Role::SuperAdmin, Some(field)) => Err(format!(
                "super admin cannot have an assigned field (got {})",
                field
            )),
            (Role::FieldAdmin, Some(field)) => Ok(Principal::FieldAdmin {
                assigned_field: field,
            }),
            (Role::FieldAdmin, None) => Err("field admin requires an assigned field".to_string()),
        }
    }

    /// Create a field admin principal.
    pub fn field_admin(field: EngineeringField) -> Self {
        Principal::FieldAdmin {
            assigned_field: field,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::SuperAdmin => Role::SuperAdmin,
            Principal::FieldAdmin { .. } => Role::FieldAdmin,
        }
    }

    pub fn assigned_field(&self) -> Option<EngineeringField> {
        match self {
            Principal::SuperAdmin => None,
            Principal::FieldAdmin { assigned_field } => Some(*assigned_field),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Principal::SuperAdmin)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::SuperAdmin => write!(f, "super_admin"),
            Principal::FieldAdmin { assigned_field } => {
                write!(f, "field_admin:{}", assigned_field)
            }
        }
    }
}
