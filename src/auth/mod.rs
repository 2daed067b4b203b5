//! Authentication for directory administrators.
//!
//! Accounts come from configuration and sign in with email and password.
//! A successful login yields a [`Session`], which the HTTP layer carries as
//! a signed bearer token.

mod middleware;

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::acl::{resolve_scope, AccessScope, Principal, Role};
use crate::config::{AccountConfig, AuthConfig};
use crate::error::{AuthError, Result};
use crate::model::EngineeringField;

pub use middleware::{AuthLayer, AuthMiddleware};

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub username: String,
    #[serde(flatten)]
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn scope(&self) -> AccessScope {
        resolve_scope(Some(&self.principal))
    }
}

/// Holder for the current session, with explicit login/logout lifecycle.
#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<Session>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign in, replacing any existing session.
    pub fn login(
        &mut self,
        authenticator: &Authenticator,
        email: &str,
        password: &str,
    ) -> Result<&Session> {
        let session = authenticator.login(email, password)?;
        Ok(self.current.insert(session))
    }

    /// Restore a session, e.g. from a stored token.
    pub fn restore(&mut self, session: Session) {
        self.current = Some(session);
    }

    /// Sign out. Returns the session that was cleared.
    pub fn logout(&mut self) -> Option<Session> {
        let previous = self.current.take();
        if let Some(ref session) = previous {
            tracing::info!(user = %session.email, "signed out");
        }
        previous
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.current.as_ref().map(|s| &s.principal)
    }

    /// Scope of the current session; nothing when signed out.
    pub fn scope(&self) -> AccessScope {
        resolve_scope(self.principal())
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_field: Option<EngineeringField>,
    pub iss: String,
    pub aud: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

/// Authenticator that validates credentials and session tokens.
#[derive(Clone)]
pub struct Authenticator {
    config: AuthConfig,
    accounts: HashMap<String, AccountConfig>,
}

impl Authenticator {
    /// Create a new authenticator from config.
    pub fn new(config: AuthConfig) -> Self {
        let accounts = config
            .accounts
            .iter()
            .map(|a| (a.email.to_lowercase(), a.clone()))
            .collect();
        Self { config, accounts }
    }

    /// Check an email/password pair and open a session.
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let account = self
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| verify_password(password, &a.password_sha256))
            .ok_or_else(|| {
                tracing::warn!(email, "failed sign-in");
                AuthError::InvalidCredentials
            })?;

        let principal = account.principal()?;
        tracing::info!(user = %account.email, %principal, "signed in");

        Ok(Session {
            user_id: account.id.clone(),
            email: account.email.clone(),
            username: account.username.clone(),
            principal,
            issued_at: Utc::now(),
        })
    }

    /// Authenticate a request from its Authorization header.
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<Session> {
        let header = auth_header.ok_or(AuthError::MissingCredentials)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidCredentials)?;
        self.verify_token(token.trim())
    }

    /// Issue a signed token for a session.
    pub fn issue_token(&self, session: &Session) -> Result<String> {
        let secret = self.jwt_secret()?;
        let iat = session.issued_at;
        let lifetime = match self.config.jwt.expiry_secs {
            0 => Duration::days(365),
            secs => i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or_else(|| {
                    AuthError::TokenGeneration(format!("token lifetime {}s is out of range", secs))
                })?,
        };
        let expiry = iat.checked_add_signed(lifetime).ok_or_else(|| {
            AuthError::TokenGeneration("token expiry is out of range".to_string())
        })?;

        let claims = JwtClaims {
            sub: session.user_id.clone(),
            email: session.email.clone(),
            username: session.username.clone(),
            role: session.principal.role(),
            assigned_field: session.principal.assigned_field(),
            iss: self.config.jwt.issuer.clone(),
            aud: self.config.jwt.audience.clone(),
            exp: expiry.timestamp(),
            iat: iat.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGeneration(e.to_string()).into())
    }

    /// Validate a token and rebuild its session.
    pub fn verify_token(&self, token: &str) -> Result<Session> {
        let secret = self.jwt_secret()?;

        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.jwt.issuer]);
        validation.set_audience(&[&self.config.jwt.audience]);
        if self.config.jwt.expiry_secs == 0 {
            validation.validate_exp = false;
        }

        let claims = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

        let principal = Principal::from_parts(claims.role, claims.assigned_field)
            .map_err(AuthError::InvalidToken)?;
        let issued_at = Utc
            .timestamp_opt(claims.iat, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidToken("bad iat".to_string()))?;

        Ok(Session {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
            principal,
            issued_at,
        })
    }

    /// Get the JWT secret from config or environment.
    fn jwt_secret(&self) -> Result<String> {
        if !self.config.jwt.secret.is_empty() {
            return Ok(self.config.jwt.secret.clone());
        }

        std::env::var("ALUMNI_HUB_JWT_SECRET").map_err(|_| AuthError::MissingSecret.into())
    }
}

/// Hex SHA-256 digest of a password, as stored in account config.
pub fn hash_password(password: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password).eq_ignore_ascii_case(stored_hash)
}

mod hex {
    pub fn encode(data: impl AsRef<[u8]>) -> String {
        data.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
