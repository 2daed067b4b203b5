//! alumni-hub: role-scoped alumni directory over a Strapi CMS.
//!
//! Batchmate records are segmented by engineering field. A super admin sees
//! every record; a field admin sees and edits only its own field. Search is
//! a conjunctive filter over an in-memory candidate set, with an optional
//! free-text query.

pub mod acl;
pub mod api;
pub mod auth;
pub mod cms;
pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod search;
pub mod server;
pub mod users;
pub mod views;

pub use acl::{authorize_write, can_edit, resolve_scope, AccessScope, Principal, Role};
pub use api::{create_rest_router, ApiState, RestApiConfig};
pub use auth::{hash_password, AuthLayer, AuthMiddleware, Authenticator, Session, SessionState};
pub use cms::{BatchmateBackend, CmsFilters, MemoryBackend, StrapiClient, UserBackend};
pub use config::Config;
pub use directory::Directory;
pub use error::{AccessError, AlumniError, AuthError, CmsError, Result, ValidationErrors};
pub use model::{Batchmate, BatchmateData, BatchmatePatch, EngineeringField, UserAccount};
pub use search::{search, search_owned, CriteriaKey, FilterCriteria};
pub use server::run_http;
pub use users::{ensure_field_available, field_coverage, UserManager};
pub use views::{CandidateBuffer, DashboardStats, Listing, ListingQuery, Report, ReportRequest};
