//! Content-management backend access.
//!
//! Records and admin accounts live in a remote CMS. This module defines the
//! backend traits the directory service depends on, a REST client for
//! Strapi, and an in-memory implementation.

mod memory;
pub mod normalize;
mod query;
mod strapi;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    Batchmate, BatchmateData, BatchmatePatch, CmsRole, NewUserAccount, UserAccount,
    UserAccountUpdate,
};

pub use memory::MemoryBackend;
pub use query::{operator, pagination_params, populate_params, CmsFilters};
pub use strapi::{error_from_response, StrapiClient};

/// Storage of batchmate records.
#[async_trait]
pub trait BatchmateBackend: Send + Sync {
    /// Fetch every record passing `filters`.
    async fn list(&self, filters: &CmsFilters) -> Result<Vec<Batchmate>>;

    /// Fetch one record by numeric or document id.
    async fn get(&self, key: &str) -> Result<Batchmate>;

    async fn create(&self, data: &BatchmateData) -> Result<Batchmate>;

    async fn update(&self, key: &str, patch: &BatchmatePatch) -> Result<Batchmate>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Admin account management.
#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserAccount>>;

    async fn get_user(&self, id: u64) -> Result<UserAccount>;

    async fn create_user(&self, data: &NewUserAccount) -> Result<UserAccount>;

    async fn update_user(&self, id: u64, update: &UserAccountUpdate) -> Result<UserAccount>;

    async fn delete_user(&self, id: u64) -> Result<()>;

    /// Roles an account can be given.
    async fn roles(&self) -> Result<Vec<CmsRole>>;
}
