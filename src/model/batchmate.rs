//! Batchmate records and their write payloads.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::EngineeringField;
use crate::error::ValidationErrors;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// One alumni profile as held in memory.
///
/// Records are owned by the CMS; values of this type are transient copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batchmate {
    /// Numeric CMS id, in string form.
    pub id: String,
    /// Stable document id (newer CMS versions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub field: EngineeringField,
    pub calling_name: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    pub email: String,
    pub whatsapp_mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// URL of the university-era photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university_photo: Option<String>,
    /// URL of the current photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batchmate {
    /// Key used to address this record in CRUD calls.
    pub fn key(&self) -> &str {
        self.document_id.as_deref().unwrap_or(&self.id)
    }

    /// Whether `key` identifies this record by either id.
    pub fn has_key(&self, key: &str) -> bool {
        self.id == key || self.document_id.as_deref() == Some(key)
    }
}

/// Payload for creating a batchmate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchmateData {
    pub calling_name: String,
    pub full_name: String,
    pub whatsapp_mobile: String,
    pub email: String,
    pub field: EngineeringField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

impl BatchmateData {
    /// Create a payload with the mandatory attributes.
    pub fn new(
        calling_name: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        whatsapp_mobile: impl Into<String>,
        field: EngineeringField,
    ) -> Self {
        Self {
            calling_name: calling_name.into(),
            full_name: full_name.into(),
            whatsapp_mobile: whatsapp_mobile.into(),
            email: email.into(),
            field,
            nick_name: None,
            address: None,
            country: None,
            working_place: None,
            mobile: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_nick_name(mut self, nick_name: impl Into<String>) -> Self {
        self.nick_name = Some(nick_name.into());
        self
    }

    pub fn with_working_place(mut self, working_place: impl Into<String>) -> Self {
        self.working_place = Some(working_place.into());
        self
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    /// Check required attributes and the email format.
    ///
    /// All failures are collected so a form can show them together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "callingName", &self.calling_name, "Calling name is required");
        require(&mut errors, "fullName", &self.full_name, "Full name is required");
        require(
            &mut errors,
            "whatsappMobile",
            &self.whatsapp_mobile,
            "WhatsApp number is required",
        );
        check_email(&mut errors, &self.email);
        errors.into_result()
    }

    /// Build the record the CMS would return for this payload.
    pub fn into_batchmate(self, id: impl Into<String>, now: DateTime<Utc>) -> Batchmate {
        Batchmate {
            id: id.into(),
            document_id: None,
            field: self.field,
            calling_name: self.calling_name,
            full_name: self.full_name,
            nick_name: self.nick_name,
            email: self.email,
            whatsapp_mobile: self.whatsapp_mobile,
            mobile: self.mobile,
            country: self.country,
            working_place: self.working_place,
            address: self.address,
            university_photo: None,
            current_photo: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent attributes are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchmatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<EngineeringField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

impl BatchmatePatch {
    /// Validate the attributes that are present.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ref value) = self.calling_name {
            require(&mut errors, "callingName", value, "Calling name is required");
        }
        if let Some(ref value) = self.full_name {
            require(&mut errors, "fullName", value, "Full name is required");
        }
        if let Some(ref value) = self.whatsapp_mobile {
            require(&mut errors, "whatsappMobile", value, "WhatsApp number is required");
        }
        if let Some(ref value) = self.email {
            check_email(&mut errors, value);
        }
        errors.into_result()
    }

    /// Apply the present attributes to a record.
    pub fn apply_to(&self, record: &mut Batchmate, now: DateTime<Utc>) {
        if let Some(ref v) = self.calling_name {
            record.calling_name = v.clone();
        }
        if let Some(ref v) = self.full_name {
            record.full_name = v.clone();
        }
        if let Some(ref v) = self.whatsapp_mobile {
            record.whatsapp_mobile = v.clone();
        }
        if let Some(ref v) = self.email {
            record.email = v.clone();
        }
        if let Some(field) = self.field {
            record.field = field;
        }
        if self.nick_name.is_some() {
            record.nick_name = self.nick_name.clone();
        }
        if self.address.is_some() {
            record.address = self.address.clone();
        }
        if self.country.is_some() {
            record.country = self.country.clone();
        }
        if self.working_place.is_some() {
            record.working_place = self.working_place.clone();
        }
        if self.mobile.is_some() {
            record.mobile = self.mobile.clone();
        }
        record.updated_at = now;
    }
}

fn require(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.add("email", "Invalid email format");
    }
}
