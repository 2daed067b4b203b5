//! REST client for a Strapi CMS.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::normalize::{normalize_list, normalize_single};
use super::query::{pagination_params, populate_params, CmsFilters};
use super::{BatchmateBackend, UserBackend};
use crate::config::CmsConfig;
use crate::error::{CmsError, Result};
use crate::model::{
    Batchmate, BatchmateData, BatchmatePatch, CmsRole, NewUserAccount, UserAccount,
    UserAccountUpdate,
};

/// Strapi error body: `{error: {status, message, details: {errors: [...]}}}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<ErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    message: String,
}

/// `meta.pagination` of a list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    page: usize,
    page_count: usize,
}

/// Map a non-success response to a [`CmsError`].
pub fn error_from_response(status: u16, body: &str) -> CmsError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();

    if let Some(details) = parsed.as_ref().and_then(|b| b.error.details.as_ref()) {
        if !details.errors.is_empty() {
            return CmsError::Validation(details.errors.iter().map(|e| e.message.clone()).collect());
        }
    }

    let message = parsed
        .and_then(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "An error occurred".to_string());

    if status == 404 {
        CmsError::NotFound(message)
    } else {
        CmsError::Status { status, message }
    }
}

/// Strapi REST client for batchmates and user management.
pub struct StrapiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    page_size: usize,
}

impl StrapiClient {
    /// Create a client from configuration.
    pub fn from_config(config: &CmsConfig) -> Result<Self> {
        Self::build(
            &config.base_url,
            config.resolved_token(),
            config.timeout_secs,
            config.page_size,
        )
    }

    /// Create a client with explicit parameters.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let defaults = CmsConfig::default();
        Self::build(base_url, token, defaults.timeout_secs, defaults.page_size)
    }

    fn build(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
        page_size: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(CmsError::from)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            page_size: page_size.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the JSON body, mapping error responses.
    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "CMS request failed");
            CmsError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(CmsError::from)?;

        if !status.is_success() {
            let err = error_from_response(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), error = %err, "CMS error response");
            return Err(err.into());
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| CmsError::Malformed(format!("invalid JSON: {}", e)).into())
    }

    async fn send_as<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.send(builder).await?;
        serde_json::from_value(body).map_err(|e| CmsError::Malformed(e.to_string()).into())
    }

    /// Fetch one page of batchmates. Returns the records and the page count.
    async fn list_page(&self, filters: &CmsFilters, page: usize) -> Result<(Vec<Batchmate>, usize)> {
        let mut params = populate_params();
        params.extend(filters.params());
        params.extend(pagination_params(page, self.page_size));

        let body = self
            .send(self.request(Method::GET, "batchmates").query(&params))
            .await?;

        let page_count = body
            .get("meta")
            .and_then(|m| m.get("pagination"))
            .and_then(|p| serde_json::from_value::<Pagination>(p.clone()).ok())
            .map(|p| p.page_count.max(p.page))
            .unwrap_or(page);

        Ok((normalize_list(&body)?, page_count))
    }
}

#[async_trait]
impl BatchmateBackend for StrapiClient {
    async fn list(&self, filters: &CmsFilters) -> Result<Vec<Batchmate>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let (batch, page_count) = self.list_page(filters, page).await?;
            records.extend(batch);
            if page >= page_count {
                break;
            }
            page += 1;
        }

        tracing::info!(count = records.len(), pages = page, "fetched batchmates");
        Ok(records)
    }

    async fn get(&self, key: &str) -> Result<Batchmate> {
        let body = self
            .send(
                self.request(Method::GET, &format!("batchmates/{}", key))
                    .query(&populate_params()),
            )
            .await?;
        Ok(normalize_single(&body)?)
    }

    async fn create(&self, data: &BatchmateData) -> Result<Batchmate> {
        let body = self
            .send(
                self.request(Method::POST, "batchmates")
                    .json(&json!({ "data": data })),
            )
            .await?;
        let record = normalize_single(&body)?;
        tracing::info!(id = %record.id, field = %record.field, "created batchmate");
        Ok(record)
    }

    async fn update(&self, key: &str, patch: &BatchmatePatch) -> Result<Batchmate> {
        let body = self
            .send(
                self.request(Method::PUT, &format!("batchmates/{}", key))
                    .json(&json!({ "data": patch })),
            )
            .await?;
        let record = normalize_single(&body)?;
        tracing::info!(id = %record.id, "updated batchmate");
        Ok(record)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("batchmates/{}", key)))
            .await?;
        tracing::info!(key, "deleted batchmate");
        Ok(())
    }
}

#[async_trait]
impl UserBackend for StrapiClient {
    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.send_as(self.request(Method::GET, "user-management/all"))
            .await
    }

    async fn get_user(&self, id: u64) -> Result<UserAccount> {
        self.send_as(self.request(Method::GET, &format!("user-management/{}", id)))
            .await
    }

    async fn create_user(&self, data: &NewUserAccount) -> Result<UserAccount> {
        let user: UserAccount = self
            .send_as(self.request(Method::POST, "user-management/create").json(data))
            .await?;
        tracing::info!(id = user.id, email = %user.email, "created user");
        Ok(user)
    }

    async fn update_user(&self, id: u64, update: &UserAccountUpdate) -> Result<UserAccount> {
        self.send_as(
            self.request(Method::PUT, &format!("user-management/update/{}", id))
                .json(update),
        )
        .await
    }

    async fn delete_user(&self, id: u64) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("user-management/delete/{}", id)))
            .await?;
        tracing::info!(id, "deleted user");
        Ok(())
    }

    async fn roles(&self) -> Result<Vec<CmsRole>> {
        let body = self
            .send(self.request(Method::GET, "user-management/roles"))
            .await?;
        let roles = match body {
            Value::Object(mut object) => object.remove("roles").unwrap_or(Value::Null),
            other => other,
        };
        serde_json::from_value(roles).map_err(|e| CmsError::Malformed(e.to_string()).into())
    }
}
