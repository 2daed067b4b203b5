//! REST API router and configuration.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    countries_handler, create_batchmate_handler, create_user_handler, dashboard_handler,
    delete_batchmate_handler, delete_user_handler, field_view_handler, get_batchmate_handler,
    get_user_handler, health_handler, list_batchmates_handler, list_users_handler, login_handler,
    me_handler, report_handler, roles_handler, update_batchmate_handler, update_user_handler,
    ApiState,
};
use crate::auth::AuthLayer;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    /// Enable CORS.
    pub enable_cors: bool,
    /// API prefix (e.g., "/api/v1").
    pub prefix: String,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            prefix: "/api/v1".to_string(),
        }
    }
}

/// Create the REST API router.
///
/// Endpoints:
/// - POST   /api/v1/login            - Exchange credentials for a token
/// - GET    /api/v1/me               - Current session
/// - GET    /api/v1/batchmates       - Search records in scope
/// - POST   /api/v1/batchmates       - Create a record
/// - GET    /api/v1/batchmates/:id   - Get a record
/// - PUT    /api/v1/batchmates/:id   - Update a record
/// - DELETE /api/v1/batchmates/:id   - Delete a record
/// - GET    /api/v1/fields/:field    - One field with advanced filters
/// - GET    /api/v1/countries        - Country choices
/// - GET    /api/v1/dashboard        - Overview statistics
/// - POST   /api/v1/reports          - Generate a report
/// - GET    /api/v1/users            - Admin accounts (super admin)
/// - POST   /api/v1/users            - Create an admin account (super admin)
/// - GET    /api/v1/users/:id        - Get an admin account (super admin)
/// - PUT    /api/v1/users/:id        - Update an admin account (super admin)
/// - DELETE /api/v1/users/:id        - Delete an admin account (super admin)
/// - GET    /api/v1/roles            - Assignable roles (super admin)
/// - GET    /health                  - Liveness check
///
/// Everything except login and health requires a bearer token.
pub fn create_rest_router(state: ApiState, config: &RestApiConfig) -> Router {
    let authenticator = state.authenticator.clone();
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/login", post(login_handler))
        .route("/me", get(me_handler))
        .route(
            "/batchmates",
            get(list_batchmates_handler).post(create_batchmate_handler),
        )
        .route(
            "/batchmates/:id",
            get(get_batchmate_handler)
                .put(update_batchmate_handler)
                .delete(delete_batchmate_handler),
        )
        .route("/fields/:field", get(field_view_handler))
        .route("/countries", get(countries_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/reports", post(report_handler))
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/:id",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route("/roles", get(roles_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest(&config.prefix, api_routes)
        .layer(AuthLayer::new(authenticator))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(Any);

        router.layer(cors)
    } else {
        router
    }
}
