//! Structured filter criteria.

use serde::{Deserialize, Serialize};

use crate::model::EngineeringField;

/// Sentinel the dashboard forms use for "any value" in enumerated selects.
const ANY_SENTINEL: &str = "all";

/// Keys a criteria set can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriteriaKey {
    CallingName,
    FullName,
    NickName,
    WorkingPlace,
    WhatsappMobile,
    Mobile,
    Country,
    Field,
}

impl CriteriaKey {
    pub const ALL: [CriteriaKey; 8] = [
        CriteriaKey::CallingName,
        CriteriaKey::FullName,
        CriteriaKey::NickName,
        CriteriaKey::WorkingPlace,
        CriteriaKey::WhatsappMobile,
        CriteriaKey::Mobile,
        CriteriaKey::Country,
        CriteriaKey::Field,
    ];

    /// Record attribute name on the wire.
    pub fn attribute(&self) -> &'static str {
        match self {
            CriteriaKey::CallingName => "callingName",
            CriteriaKey::FullName => "fullName",
            CriteriaKey::NickName => "nickName",
            CriteriaKey::WorkingPlace => "workingPlace",
            CriteriaKey::WhatsappMobile => "whatsappMobile",
            CriteriaKey::Mobile => "mobile",
            CriteriaKey::Country => "country",
            CriteriaKey::Field => "field",
        }
    }

    /// Enumerated keys match by equality; the rest by substring.
    pub fn is_enumerated(&self) -> bool {
        matches!(self, CriteriaKey::Country | CriteriaKey::Field)
    }

    pub fn from_attribute(name: &str) -> Option<Self> {
        CriteriaKey::ALL.into_iter().find(|k| k.attribute() == name)
    }
}

/// Filter values keyed by record attribute. `None` means unconstrained.
///
/// `field` and `country` are compared by exact string equality, so a value
/// outside the fixed lists is accepted and simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calling_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build criteria from raw form pairs, e.g. query-string parameters.
    ///
    /// Unknown keys are ignored. Blank values and the `"all"` sentinel on
    /// enumerated keys mean "no constraint".
    pub fn from_form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut criteria = Self::default();
        for (name, value) in pairs {
            if let Some(key) = CriteriaKey::from_attribute(name) {
                criteria.set(key, Some(value.to_string()));
            }
        }
        criteria.normalized()
    }

    /// Collapse blank values and enumerated sentinels to `None`.
    pub fn normalized(mut self) -> Self {
        for key in CriteriaKey::ALL {
            let keep = match self.get(key) {
                None => false,
                Some(value) => {
                    let trimmed = value.trim();
                    !(trimmed.is_empty()
                        || (key.is_enumerated() && trimmed.eq_ignore_ascii_case(ANY_SENTINEL)))
                }
            };
            if !keep {
                self.set(key, None);
            }
        }
        self
    }

    pub fn get(&self, key: CriteriaKey) -> Option<&str> {
        let slot = match key {
            CriteriaKey::CallingName => &self.calling_name,
            CriteriaKey::FullName => &self.full_name,
            CriteriaKey::NickName => &self.nick_name,
            CriteriaKey::WorkingPlace => &self.working_place,
            CriteriaKey::WhatsappMobile => &self.whatsapp_mobile,
            CriteriaKey::Mobile => &self.mobile,
            CriteriaKey::Country => &self.country,
            CriteriaKey::Field => &self.field,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, key: CriteriaKey, value: Option<String>) {
        let slot = match key {
            CriteriaKey::CallingName => &mut self.calling_name,
            CriteriaKey::FullName => &mut self.full_name,
            CriteriaKey::NickName => &mut self.nick_name,
            CriteriaKey::WorkingPlace => &mut self.working_place,
            CriteriaKey::WhatsappMobile => &mut self.whatsapp_mobile,
            CriteriaKey::Mobile => &mut self.mobile,
            CriteriaKey::Country => &mut self.country,
            CriteriaKey::Field => &mut self.field,
        };
        *slot = value;
    }

    /// Set one key, builder style.
    pub fn with(mut self, key: CriteriaKey, value: impl Into<String>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    pub fn with_field(self, field: EngineeringField) -> Self {
        self.with(CriteriaKey::Field, field.as_str())
    }

    pub fn with_country(self, country: impl Into<String>) -> Self {
        self.with(CriteriaKey::Country, country)
    }

    /// Keys that currently constrain the result.
    pub fn active(&self) -> impl Iterator<Item = (CriteriaKey, &str)> + '_ {
        CriteriaKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Remove every constraint.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
