//! Configuration settings for the alumni directory service.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::acl::{Principal, Role};
use crate::error::{ConfigError, Result};
use crate::model::EngineeringField;

/// Longest accepted session token lifetime: ten years.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cms: CmsConfig,
    pub auth: AuthConfig,
    pub views: ViewConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("alumni-hub.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("alumni-hub/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".alumni-hub/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.cms.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("cms.base_url".to_string()).into());
        }
        if self.cms.page_size == 0 {
            return Err(ConfigError::Invalid("cms.page_size must be > 0".to_string()).into());
        }
        if self.auth.jwt.expiry_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt.expiry_secs must be at most {}",
                MAX_TOKEN_LIFETIME_SECS
            ))
            .into());
        }
        if self.views.preview_limit == 0 {
            return Err(ConfigError::Invalid("views.preview_limit must be > 0".to_string()).into());
        }

        let mut seen = HashSet::new();
        for account in &self.auth.accounts {
            account.principal()?;
            if !seen.insert(account.email.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate account email: {}",
                    account.email
                ))
                .into());
            }
            if account.password_sha256.len() != 64 {
                return Err(ConfigError::Invalid(format!(
                    "account {}: password_sha256 must be a 64-character hex digest",
                    account.email
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Enable permissive CORS for a separately hosted front end
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Content-management backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Base URL of the CMS REST API, including the `/api` prefix
    pub base_url: String,
    /// API token (loaded from ALUMNI_HUB_CMS_TOKEN if not set)
    pub api_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Records requested per page when fetching a full set
    pub page_size: usize,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337/api".to_string(),
            api_token: None,
            timeout_secs: 30,
            page_size: 100,
        }
    }
}

impl CmsConfig {
    /// API token from config or environment.
    pub fn resolved_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("ALUMNI_HUB_CMS_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session token settings
    pub jwt: JwtConfig,
    /// Admin accounts allowed to sign in
    pub accounts: Vec<AccountConfig>,
}

/// JWT session token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Signing secret (loaded from ALUMNI_HUB_JWT_SECRET if empty)
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Token lifetime in seconds; 0 disables expiry checks
    pub expiry_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "alumni-hub".to_string(),
            audience: "alumni-hub-admins".to_string(),
            expiry_secs: 8 * 3600,
        }
    }
}

/// One admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub id: String,
    pub email: String,
    pub username: String,
    /// Hex SHA-256 digest of the password
    pub password_sha256: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_field: Option<EngineeringField>,
}

impl AccountConfig {
    /// Principal for this account, checking the role/field invariant.
    pub fn principal(&self) -> Result<Principal> {
        Principal::from_parts(self.role, self.assigned_field).map_err(|e| {
            ConfigError::Invalid(format!("account {}: {}", self.email, e)).into()
        })
    }
}

/// Limits used by the dashboard views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Rows shown in listing and report previews
    pub preview_limit: usize,
    /// Rows in the "recently added" panel
    pub recent_limit: usize,
    /// Countries included in report country stats
    pub country_stats_limit: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            preview_limit: 20,
            recent_limit: 5,
            country_stats_limit: 10,
        }
    }
}
