//! Admin account management, restricted to super admins.
//!
//! Each engineering field has at most one field admin.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::acl::{Principal, Role};
use crate::cms::UserBackend;
use crate::error::{AccessError, Result, ValidationErrors};
use crate::model::{CmsRole, EngineeringField, NewUserAccount, UserAccount, UserAccountUpdate};

/// Field admin holding a field, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAssignment {
    pub field: EngineeringField,
    pub admin: Option<UserAccount>,
}

/// Reject the principal unless it is a super admin.
pub fn require_super_admin(principal: Option<&Principal>) -> std::result::Result<(), AccessError> {
    match principal {
        None => Err(AccessError::Unauthenticated),
        Some(p) if p.is_super_admin() => Ok(()),
        Some(p) => {
            tracing::debug!(principal = %p, "user management denied");
            Err(AccessError::Forbidden(
                "only super admins can manage users".to_string(),
            ))
        }
    }
}

/// Check that no other field admin holds `field`.
///
/// `editing` is the id of the account being edited, which may keep its own
/// field.
pub fn ensure_field_available(
    users: &[UserAccount],
    field: EngineeringField,
    editing: Option<u64>,
) -> std::result::Result<(), ValidationErrors> {
    let taken = users.iter().any(|u| {
        u.is_field_admin() && u.assigned_field == Some(field) && Some(u.id) != editing
    });
    let mut errors = ValidationErrors::new();
    if taken {
        errors.add(
            "assignedField",
            format!("{} already has a field admin", field),
        );
    }
    errors.into_result()
}

/// Which field admin holds each field, in enumeration order.
pub fn field_coverage(users: &[UserAccount]) -> Vec<FieldAssignment> {
    let mut by_field: BTreeMap<EngineeringField, &UserAccount> = BTreeMap::new();
    for user in users.iter().filter(|u| u.is_field_admin()) {
        if let Some(field) = user.assigned_field {
            by_field.entry(field).or_insert(user);
        }
    }
    EngineeringField::ALL
        .into_iter()
        .map(|field| FieldAssignment {
            field,
            admin: by_field.get(&field).map(|u| (*u).clone()),
        })
        .collect()
}

/// Super-admin user management over a backend.
pub struct UserManager<U: ?Sized = dyn UserBackend> {
    backend: Arc<U>,
}

impl<U: ?Sized> Clone for UserManager<U> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<U: UserBackend + ?Sized> UserManager<U> {
    pub fn new(backend: Arc<U>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, principal: Option<&Principal>) -> Result<Vec<UserAccount>> {
        require_super_admin(principal)?;
        self.backend.list_users().await
    }

    pub async fn get(&self, principal: Option<&Principal>, id: u64) -> Result<UserAccount> {
        require_super_admin(principal)?;
        self.backend.get_user(id).await
    }

    pub async fn roles(&self, principal: Option<&Principal>) -> Result<Vec<CmsRole>> {
        require_super_admin(principal)?;
        self.backend.roles().await
    }

    pub async fn coverage(&self, principal: Option<&Principal>) -> Result<Vec<FieldAssignment>> {
        Ok(field_coverage(&self.list(principal).await?))
    }

    pub async fn create(
        &self,
        principal: Option<&Principal>,
        data: &NewUserAccount,
    ) -> Result<UserAccount> {
        require_super_admin(principal)?;

        let mut errors = ValidationErrors::new();
        if data.username.trim().is_empty() {
            errors.add("username", "Username is required");
        }
        if data.email.trim().is_empty() {
            errors.add("email", "Email is required");
        }
        if data.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()?;

        let role = self.role_by_id(data.role).await?;
        self.check_assignment(role, data.assigned_field, None).await?;
        self.backend.create_user(data).await
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: u64,
        update: &UserAccountUpdate,
    ) -> Result<UserAccount> {
        require_super_admin(principal)?;
        let existing = self.backend.get_user(id).await?;

        let role = match update.role {
            Some(role_id) => self.role_by_id(role_id).await?,
            None => existing.role.directory_role(),
        };
        let field = update.assigned_field.or(existing.assigned_field);
        self.check_assignment(role, field, Some(id)).await?;

        self.backend.update_user(id, update).await
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: u64) -> Result<()> {
        require_super_admin(principal)?;
        self.backend.delete_user(id).await
    }

    async fn role_by_id(&self, role_id: u64) -> Result<Option<Role>> {
        let roles = self.backend.roles().await?;
        match roles.iter().find(|r| r.id == role_id) {
            Some(role) => Ok(role.directory_role()),
            None => {
                let mut errors = ValidationErrors::new();
                errors.add("role", format!("Unknown role {}", role_id));
                Err(errors.into())
            }
        }
    }

    /// Field admins need a free field; other roles take none.
    async fn check_assignment(
        &self,
        role: Option<Role>,
        field: Option<EngineeringField>,
        editing: Option<u64>,
    ) -> Result<()> {
        match (role, field) {
            (Some(Role::FieldAdmin), None) => {
                let mut errors = ValidationErrors::new();
                errors.add("assignedField", "Field admins need an assigned field");
                Err(errors.into())
            }
            (Some(Role::FieldAdmin), Some(field)) => {
                let users = self.backend.list_users().await?;
                ensure_field_available(&users, field, editing)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
