//! CLI command handlers.
//!
//! One-shot commands talk to the CMS directly with the configured API token.
//! When credentials are given, results are narrowed to that account's scope.

use std::sync::Arc;

use alumni_hub::{
    hash_password, Authenticator, Config, Directory, EngineeringField, FilterCriteria, Principal,
    ReportRequest, StrapiClient,
};
use anyhow::{bail, Result};

use super::output;

/// Optional sign-in for scoping one-shot commands.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Load configuration from an explicit path or the default locations.
pub fn load_config(path: &Option<String>) -> Result<Config> {
    Ok(match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    })
}

/// Resolve the principal for a command.
///
/// Without credentials the operator already holds the CMS token, so the
/// command runs with the super-admin scope.
fn resolve_principal(config: &Config, credentials: &Credentials) -> Result<Principal> {
    match (&credentials.email, &credentials.password) {
        (Some(email), Some(password)) => {
            let session = Authenticator::new(config.auth.clone()).login(email, password)?;
            Ok(session.principal)
        }
        (None, None) => {
            tracing::debug!("no credentials given, using super-admin scope");
            Ok(Principal::SuperAdmin)
        }
        _ => bail!("--email and --password must be given together"),
    }
}

fn directory(config: &Config) -> Result<Directory<StrapiClient>> {
    Ok(Directory::new(Arc::new(StrapiClient::from_config(
        &config.cms,
    )?)))
}

/// Run the search command.
pub async fn run_search(
    config: Config,
    credentials: Credentials,
    criteria: FilterCriteria,
    query: Option<String>,
    limit: Option<usize>,
    json_output: bool,
) -> Result<()> {
    let principal = resolve_principal(&config, &credentials)?;
    let results = directory(&config)?
        .search(Some(&principal), &criteria, query.as_deref())
        .await?;
    let limit = limit.unwrap_or(config.views.preview_limit);
    output::print_search_results(&results, limit, json_output);
    Ok(())
}

/// Run the stats command.
pub async fn run_stats(config: Config, credentials: Credentials, json_output: bool) -> Result<()> {
    let principal = resolve_principal(&config, &credentials)?;
    let stats = directory(&config)?
        .dashboard(Some(&principal), config.views.recent_limit)
        .await?;
    output::print_stats(&stats, json_output);
    Ok(())
}

/// Run the report command.
pub async fn run_report(
    config: Config,
    credentials: Credentials,
    fields: Vec<EngineeringField>,
    country: Option<String>,
    json_output: bool,
) -> Result<()> {
    let request = match country {
        Some(_) if !fields.is_empty() => bail!("--field and --country cannot be combined"),
        Some(country) => ReportRequest::ByCountry { country },
        None => ReportRequest::ByFields { fields },
    };

    let principal = resolve_principal(&config, &credentials)?;
    let report = directory(&config)?
        .report(Some(&principal), &request, config.views.country_stats_limit)
        .await?;
    output::print_report(&report, config.views.preview_limit, json_output);
    Ok(())
}

/// Run the hash-password command.
pub fn run_hash_password(password: &str, json_output: bool) -> Result<()> {
    if password.is_empty() {
        bail!("password must not be empty");
    }
    output::print_hash(&hash_password(password), json_output);
    Ok(())
}
