//! In-process backend for tests and offline demos.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::query::CmsFilters;
use super::{BatchmateBackend, UserBackend};
use crate::error::{CmsError, Result};
use crate::model::{
    Batchmate, BatchmateData, BatchmatePatch, CmsRole, NewUserAccount, UserAccount,
    UserAccountUpdate,
};

#[derive(Debug, Default)]
struct Store {
    batchmates: Vec<Batchmate>,
    users: Vec<UserAccount>,
    roles: Vec<CmsRole>,
    next_batchmate_id: u64,
    next_user_id: u64,
}

/// Backend holding everything in memory.
///
/// Filters behave as the CMS's would, so code paths that push criteria down
/// can be exercised without a server.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<Store>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend seeded with batchmates.
    pub fn with_batchmates(batchmates: Vec<Batchmate>) -> Self {
        let next_batchmate_id = next_id(batchmates.iter().map(|b| b.id.as_str()));
        Self {
            store: RwLock::new(Store {
                batchmates,
                next_batchmate_id,
                ..Default::default()
            }),
        }
    }

    /// Seed user accounts and the roles they can be given.
    pub fn with_users(self, users: Vec<UserAccount>, roles: Vec<CmsRole>) -> Self {
        let mut store = self.store.into_inner();
        store.next_user_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        store.users = users;
        store.roles = roles;
        Self {
            store: RwLock::new(store),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.batchmates.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0) + 1
}

fn not_found(kind: &str, key: impl std::fmt::Display) -> CmsError {
    CmsError::NotFound(format!("{} {}", kind, key))
}

#[async_trait]
impl BatchmateBackend for MemoryBackend {
    async fn list(&self, filters: &CmsFilters) -> Result<Vec<Batchmate>> {
        let store = self.store.read().await;
        Ok(store
            .batchmates
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Batchmate> {
        let store = self.store.read().await;
        store
            .batchmates
            .iter()
            .find(|r| r.has_key(key))
            .cloned()
            .ok_or_else(|| not_found("batchmate", key).into())
    }

    async fn create(&self, data: &BatchmateData) -> Result<Batchmate> {
        let mut store = self.store.write().await;
        let id = store.next_batchmate_id.max(1);
        store.next_batchmate_id = id + 1;

        let record = data.clone().into_batchmate(id.to_string(), Utc::now());
        store.batchmates.push(record.clone());
        Ok(record)
    }

    async fn update(&self, key: &str, patch: &BatchmatePatch) -> Result<Batchmate> {
        let mut store = self.store.write().await;
        let record = store
            .batchmates
            .iter_mut()
            .find(|r| r.has_key(key))
            .ok_or_else(|| not_found("batchmate", key))?;
        patch.apply_to(record, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let before = store.batchmates.len();
        store.batchmates.retain(|r| !r.has_key(key));
        if store.batchmates.len() == before {
            return Err(not_found("batchmate", key).into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserBackend for MemoryBackend {
    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        Ok(self.store.read().await.users.clone())
    }

    async fn get_user(&self, id: u64) -> Result<UserAccount> {
        let store = self.store.read().await;
        store
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("user", id).into())
    }

    async fn create_user(&self, data: &NewUserAccount) -> Result<UserAccount> {
        let mut store = self.store.write().await;
        let role = store
            .roles
            .iter()
            .find(|r| r.id == data.role)
            .cloned()
            .ok_or_else(|| CmsError::Validation(vec![format!("role {} does not exist", data.role)]))?;

        let id = store.next_user_id.max(1);
        store.next_user_id = id + 1;
        let now = Utc::now();
        let user = UserAccount {
            id,
            username: data.username.clone(),
            email: data.email.clone(),
            provider: "local".to_string(),
            confirmed: true,
            blocked: false,
            created_at: now,
            updated_at: now,
            role,
            assigned_field: data.assigned_field,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: u64, update: &UserAccountUpdate) -> Result<UserAccount> {
        let mut store = self.store.write().await;
        let role = match update.role {
            Some(role_id) => Some(
                store
                    .roles
                    .iter()
                    .find(|r| r.id == role_id)
                    .cloned()
                    .ok_or_else(|| {
                        CmsError::Validation(vec![format!("role {} does not exist", role_id)])
                    })?,
            ),
            None => None,
        };

        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("user", id))?;
        if let Some(ref username) = update.username {
            user.username = username.clone();
        }
        if let Some(ref email) = update.email {
            user.email = email.clone();
        }
        if let Some(role) = role {
            user.role = role;
        }
        if update.assigned_field.is_some() {
            user.assigned_field = update.assigned_field;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: u64) -> Result<()> {
        let mut store = self.store.write().await;
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        if store.users.len() == before {
            return Err(not_found("user", id).into());
        }
        Ok(())
    }

    async fn roles(&self) -> Result<Vec<CmsRole>> {
        Ok(self.store.read().await.roles.clone())
    }
}
