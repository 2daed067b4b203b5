//! REST API request handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::acl::{can_edit, AccessScope, Principal};
use crate::auth::{Authenticator, Session};
use crate::config::ViewConfig;
use crate::directory::Directory;
use crate::error::{AccessError, AlumniError, AuthError, CmsError, ValidationErrors};
use crate::model::{
    Batchmate, BatchmateData, BatchmatePatch, CmsRole, EngineeringField, NewUserAccount,
    UserAccount, UserAccountUpdate,
};
use crate::search::FilterCriteria;
use crate::users::{FieldAssignment, UserManager};
use crate::views::{ListingQuery, ListingRow, ReportRequest};

/// Application state shared across handlers.
pub struct ApiState {
    pub directory: Directory,
    /// Absent when the backend has no user-management endpoints.
    pub users: Option<UserManager>,
    pub authenticator: Arc<Authenticator>,
    pub views: ViewConfig,
}

impl ApiState {
    /// Create new API state.
    pub fn new(directory: Directory, authenticator: Arc<Authenticator>, views: ViewConfig) -> Self {
        Self {
            directory,
            users: None,
            authenticator,
            views,
        }
    }

    pub fn with_users(mut self, users: UserManager) -> Self {
        self.users = Some(users);
        self
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Session,
}

/// Current session response.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: Session,
    pub scope: AccessScope,
}

/// Batchmate list response.
#[derive(Debug, Clone, Serialize)]
pub struct BatchmateListResponse {
    pub results: Vec<ListingRow>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Country choices from every accessible record, not just the matches.
    pub countries: Vec<String>,
}

/// Countries response.
#[derive(Debug, Clone, Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<String>,
}

/// Users response.
#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserAccount>,
    pub coverage: Vec<FieldAssignment>,
}

/// Roles response.
#[derive(Debug, Clone, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<CmsRole>,
}

/// Health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Per-field messages for validation failures.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
}

/// Map an error to its HTTP status and response body.
pub fn error_response(err: &AlumniError) -> Response {
    let (status, code) = match err {
        AlumniError::Access(AccessError::Unauthenticated) => {
            (StatusCode::UNAUTHORIZED, "unauthenticated")
        }
        AlumniError::Access(AccessError::Forbidden(_)) => (StatusCode::FORBIDDEN, "forbidden"),
        AlumniError::Auth(AuthError::MissingSecret | AuthError::TokenGeneration(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "auth_misconfigured")
        }
        AlumniError::Auth(AuthError::InvalidToken(_)) => (StatusCode::UNAUTHORIZED, "invalid_token"),
        AlumniError::Auth(_) => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        AlumniError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
        AlumniError::Cms(CmsError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
        AlumniError::Cms(CmsError::Validation(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "cms_validation_failed")
        }
        AlumniError::Cms(_) => (StatusCode::BAD_GATEWAY, "cms_error"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };

    let fields = match err {
        AlumniError::Validation(errors) => errors
            .fields()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        _ => HashMap::new(),
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
            fields,
        }),
    )
        .into_response()
}

fn not_supported() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorResponse {
            error: "User management is not available for this backend".to_string(),
            code: "not_supported".to_string(),
            fields: HashMap::new(),
        }),
    )
        .into_response()
}

fn principal(session: &Option<Extension<Session>>) -> Option<&Principal> {
    session.as_ref().map(|Extension(s)| &s.principal)
}

fn row(principal: Option<&Principal>, record: Batchmate) -> ListingRow {
    let can_edit = principal.is_some_and(|p| can_edit(p, &record));
    ListingRow { record, can_edit }
}

// ============================================================================
// Handler Functions
// ============================================================================

/// POST /api/v1/login - Exchange credentials for a bearer token.
pub async fn login_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let session = match state.authenticator.login(&request.email, &request.password) {
        Ok(session) => session,
        Err(e) => return error_response(&e),
    };

    match state.authenticator.issue_token(&session) {
        Ok(token) => (
            StatusCode::OK,
            Json(LoginResponse {
                token,
                user: session,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/me - Current session.
pub async fn me_handler(session: Option<Extension<Session>>) -> impl IntoResponse {
    match session {
        Some(Extension(session)) => (
            StatusCode::OK,
            Json(MeResponse {
                scope: session.scope(),
                user: session,
            }),
        )
            .into_response(),
        None => error_response(&AccessError::Unauthenticated.into()),
    }
}

/// GET /api/v1/batchmates - Search the principal's records.
///
/// Query parameters: `q` for free text, any criteria key by attribute name
/// (`callingName`, `country`, ...), and `limit`.
pub async fn list_batchmates_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let principal = principal(&session);
    let query = ListingQuery::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let limit = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(state.views.preview_limit);

    match state.directory.listing(principal, &query, limit).await {
        Ok(listing) => {
            let summary = listing.results.summary();
            (
                StatusCode::OK,
                Json(BatchmateListResponse {
                    results: listing.results.rows,
                    total: listing.results.total,
                    summary,
                    countries: listing.countries,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/batchmates/:id - Get one record.
pub async fn get_batchmate_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let principal = principal(&session);
    match state.directory.get(principal, &id).await {
        Ok(record) => (StatusCode::OK, Json(row(principal, record))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/batchmates - Create a record.
pub async fn create_batchmate_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Json(data): Json<BatchmateData>,
) -> impl IntoResponse {
    let principal = principal(&session);
    match state.directory.create(principal, &data).await {
        Ok(record) => (StatusCode::CREATED, Json(row(principal, record))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/v1/batchmates/:id - Partially update a record.
pub async fn update_batchmate_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
    Json(patch): Json<BatchmatePatch>,
) -> impl IntoResponse {
    let principal = principal(&session);
    match state.directory.update(principal, &id, &patch).await {
        Ok(record) => (StatusCode::OK, Json(row(principal, record))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/v1/batchmates/:id - Delete a record.
pub async fn delete_batchmate_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.directory.delete(principal(&session), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/fields/:field - Browse one field with the advanced filters.
pub async fn field_view_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(field): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let field: EngineeringField = match field.parse() {
        Ok(field) => field,
        Err(e) => {
            let mut errors = ValidationErrors::new();
            errors.add("field", e);
            return error_response(&errors.into());
        }
    };
    let criteria = FilterCriteria::from_form(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    match state
        .directory
        .full_view(principal(&session), field, &criteria)
        .await
    {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/countries - Country choices from the principal's records.
pub async fn countries_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
) -> impl IntoResponse {
    match state.directory.countries(principal(&session)).await {
        Ok(countries) => (StatusCode::OK, Json(CountriesResponse { countries })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/dashboard - Overview statistics.
pub async fn dashboard_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
) -> impl IntoResponse {
    match state
        .directory
        .dashboard(principal(&session), state.views.recent_limit)
        .await
    {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/reports - Generate a report.
pub async fn report_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Json(request): Json<ReportRequest>,
) -> impl IntoResponse {
    match state
        .directory
        .report(principal(&session), &request, state.views.country_stats_limit)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/users - Admin accounts and field coverage (super admin only).
pub async fn list_users_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
) -> impl IntoResponse {
    let Some(ref users) = state.users else {
        return not_supported();
    };

    match users.list(principal(&session)).await {
        Ok(accounts) => {
            let coverage = crate::users::field_coverage(&accounts);
            (
                StatusCode::OK,
                Json(UsersResponse {
                    users: accounts,
                    coverage,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/users - Create an admin account (super admin only).
pub async fn create_user_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Json(data): Json<NewUserAccount>,
) -> impl IntoResponse {
    let Some(ref users) = state.users else {
        return not_supported();
    };
    match users.create(principal(&session), &data).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/users/:id - One admin account (super admin only).
pub async fn get_user_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let Some(ref users) = state.users else {
        return not_supported();
    };
    match users.get(principal(&session), id).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/v1/users/:id - Update an admin account (super admin only).
pub async fn update_user_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<u64>,
    Json(update): Json<UserAccountUpdate>,
) -> impl IntoResponse {
    let Some(ref users) = state.users else {
        return not_supported();
    };
    match users.update(principal(&session), id, &update).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/v1/users/:id - Remove an admin account (super admin only).
pub async fn delete_user_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let Some(ref users) = state.users else {
        return not_supported();
    };
    match users.delete(principal(&session), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/roles - Roles an account can be given (super admin only).
pub async fn roles_handler(
    State(state): State<Arc<ApiState>>,
    session: Option<Extension<Session>>,
) -> impl IntoResponse {
    let Some(ref users) = state.users else {
        return not_supported();
    };
    match users.roles(principal(&session)).await {
        Ok(roles) => (StatusCode::OK, Json(RolesResponse { roles })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/health - Liveness check.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
