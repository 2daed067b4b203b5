//! Normalization of CMS wire shapes into [`Batchmate`] records.
//!
//! The CMS returns either flat items (`{id, documentId, callingName, ...}`)
//! or items wrapped in `attributes` (`{id, attributes: {...}}`). Media
//! relations arrive in several shapes as well. Everything is reduced to one
//! record type here so nothing downstream sees the difference.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CmsError;
use crate::model::{Batchmate, EngineeringField};

/// Attribute set shared by both item shapes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAttributes {
    #[serde(default)]
    document_id: Option<Value>,
    field: String,
    calling_name: String,
    full_name: String,
    #[serde(default)]
    nick_name: Option<String>,
    email: String,
    whatsapp_mobile: String,
    #[serde(default)]
    mobile: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    working_place: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    university_photo: Value,
    #[serde(default)]
    current_photo: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Normalize one item from a `data` payload.
pub fn normalize_item(item: &Value) -> Result<Batchmate, CmsError> {
    let object = item
        .as_object()
        .ok_or_else(|| CmsError::Malformed("record is not an object".to_string()))?;

    let id = object
        .get("id")
        .and_then(id_string)
        .ok_or_else(|| CmsError::Malformed("record has no id".to_string()))?;

    let attributes = if object.contains_key("callingName") {
        object.clone()
    } else {
        let mut merged: Map<String, Value> = object
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| CmsError::Malformed(format!("record {}: no attributes", id)))?;
        if let Some(document_id) = object.get("documentId") {
            merged
                .entry("documentId")
                .or_insert_with(|| document_id.clone());
        }
        merged
    };

    let wire: WireAttributes = serde_json::from_value(Value::Object(attributes))
        .map_err(|e| CmsError::Malformed(format!("record {}: {}", id, e)))?;
    let field: EngineeringField = wire
        .field
        .parse()
        .map_err(|e| CmsError::Malformed(format!("record {}: {}", id, e)))?;

    Ok(Batchmate {
        id,
        document_id: wire.document_id.as_ref().and_then(id_string),
        field,
        calling_name: wire.calling_name,
        full_name: wire.full_name,
        nick_name: wire.nick_name,
        email: wire.email,
        whatsapp_mobile: wire.whatsapp_mobile,
        mobile: wire.mobile,
        country: wire.country,
        working_place: wire.working_place,
        address: wire.address,
        university_photo: photo_url(&wire.university_photo),
        current_photo: photo_url(&wire.current_photo),
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    })
}

/// Normalize the single record in a `{data: {...}}` response body.
pub fn normalize_single(body: &Value) -> Result<Batchmate, CmsError> {
    match body.get("data") {
        Some(Value::Null) | None => Err(CmsError::Malformed("response has no data".to_string())),
        Some(item) => normalize_item(item),
    }
}

/// Normalize every record in a `{data: [...]}` response body.
///
/// Items that fail normalization are skipped with a warning so one bad row
/// cannot hide the rest of the directory.
pub fn normalize_list(body: &Value) -> Result<Vec<Batchmate>, CmsError> {
    let items = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| CmsError::Malformed("response data is not a list".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| match normalize_item(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed batchmate");
                None
            }
        })
        .collect())
}

/// URL of a media reference, whatever shape it arrived in.
///
/// Accepts `null`, a bare URL string, a media object with `url`, and the
/// relation wrappers `{data: {attributes: {url}}}` / `{data: null}`.
pub fn photo_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(object) => {
            if let Some(url) = object.get("url").and_then(Value::as_str) {
                return Some(url.to_string()).filter(|u| !u.is_empty());
            }
            match object.get("data") {
                Some(Value::Object(data)) => data
                    .get("attributes")
                    .map(photo_url)
                    .unwrap_or_else(|| photo_url(&Value::Object(data.clone()))),
                Some(Value::Array(items)) => items.first().and_then(photo_url),
                _ => object.get("attributes").and_then(photo_url),
            }
        }
        Value::Array(items) => items.first().and_then(photo_url),
        _ => None,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
