//! HTTP server wiring.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::api::{create_rest_router, ApiState, RestApiConfig};
use crate::auth::Authenticator;
use crate::cms::{BatchmateBackend, StrapiClient, UserBackend};
use crate::config::Config;
use crate::directory::Directory;
use crate::users::UserManager;

/// Build handler state backed by the configured CMS.
pub fn build_state(config: &Config) -> Result<ApiState> {
    let client = Arc::new(StrapiClient::from_config(&config.cms)?);
    if config.cms.resolved_token().is_none() {
        tracing::warn!("no CMS API token configured; requests will be anonymous");
    }

    let batchmates: Arc<dyn BatchmateBackend> = client.clone();
    let accounts: Arc<dyn UserBackend> = client;

    let authenticator = Arc::new(Authenticator::new(config.auth.clone()));
    let state = ApiState::new(
        Directory::new(batchmates),
        authenticator,
        config.views.clone(),
    )
    .with_users(UserManager::new(accounts));
    Ok(state)
}

/// Build the application router.
pub fn build_router(config: &Config) -> Result<Router> {
    let rest = RestApiConfig {
        enable_cors: config.server.enable_cors,
        ..Default::default()
    };
    Ok(create_rest_router(build_state(config)?, &rest))
}

/// Serve the REST API until the process is stopped.
pub async fn run_http(config: Config) -> Result<()> {
    if config.auth.accounts.is_empty() {
        tracing::warn!("no admin accounts configured; nobody can sign in");
    }

    let app = build_router(&config)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.host))?;

    info!(%addr, cms = %config.cms.base_url, "alumni-hub listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("alumni-hub shutting down");
    Ok(())
}
