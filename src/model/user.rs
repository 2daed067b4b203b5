//! Admin user accounts managed through the CMS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EngineeringField;
use crate::acl::{Principal, Role};
use crate::error::{CmsError, Result};

/// CMS role attached to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsRole {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
}

impl CmsRole {
    /// Directory role this CMS role stands for, if any.
    pub fn directory_role(&self) -> Option<Role> {
        Role::from_str(&self.role_type).or_else(|| Role::from_str(&self.name))
    }
}

/// User account as returned by the user-management endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role: CmsRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_field: Option<EngineeringField>,
}

impl UserAccount {
    /// Principal this account signs in as.
    pub fn principal(&self) -> Result<Principal> {
        let role = self.role.directory_role().ok_or_else(|| {
            CmsError::Malformed(format!(
                "user {} has unrecognised role {}",
                self.id, self.role.role_type
            ))
        })?;
        Principal::from_parts(role, self.assigned_field)
            .map_err(|e| CmsError::Malformed(format!("user {}: {}", self.id, e)).into())
    }

    pub fn is_field_admin(&self) -> bool {
        self.role.directory_role() == Some(Role::FieldAdmin)
    }
}

/// Payload for creating a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    /// CMS role id.
    pub role: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_field: Option<EngineeringField>,
}

/// Partial update of a user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_field: Option<EngineeringField>,
}
