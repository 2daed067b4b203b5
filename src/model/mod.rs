//! Directory domain types.
//!
//! Batchmate records, user accounts and the fixed enumerations they draw
//! their values from.

mod batchmate;
mod user;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use batchmate::{Batchmate, BatchmateData, BatchmatePatch};
pub use user::{CmsRole, NewUserAccount, UserAccount, UserAccountUpdate};

/// Engineering field a batchmate graduated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EngineeringField {
    Chemical,
    Civil,
    Computer,
    Electrical,
    Electronics,
    Material,
    Mechanical,
    Mining,
    Textile,
}

impl EngineeringField {
    /// All fields in display order.
    pub const ALL: [EngineeringField; 9] = [
        EngineeringField::Chemical,
        EngineeringField::Civil,
        EngineeringField::Computer,
        EngineeringField::Electrical,
        EngineeringField::Electronics,
        EngineeringField::Material,
        EngineeringField::Mechanical,
        EngineeringField::Mining,
        EngineeringField::Textile,
    ];

    /// Wire name, as stored by the CMS.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineeringField::Chemical => "Chemical",
            EngineeringField::Civil => "Civil",
            EngineeringField::Computer => "Computer",
            EngineeringField::Electrical => "Electrical",
            EngineeringField::Electronics => "Electronics",
            EngineeringField::Material => "Material",
            EngineeringField::Mechanical => "Mechanical",
            EngineeringField::Mining => "Mining",
            EngineeringField::Textile => "Textile",
        }
    }
}

impl fmt::Display for EngineeringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineeringField {
    type Err = String;

    /// Parse a field name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineeringField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown engineering field: {}", s))
    }
}

/// Countries offered by the batchmate form.
pub const COUNTRIES: &[&str] = &[
    "Afghanistan",
    "Albania",
    "Algeria",
    "Argentina",
    "Australia",
    "Austria",
    "Bangladesh",
    "Belgium",
    "Brazil",
    "Canada",
    "Chile",
    "China",
    "Colombia",
    "Czech Republic",
    "Denmark",
    "Egypt",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hong Kong",
    "Hungary",
    "India",
    "Indonesia",
    "Iran",
    "Iraq",
    "Ireland",
    "Israel",
    "Italy",
    "Japan",
    "Jordan",
    "Kenya",
    "Kuwait",
    "Lebanon",
    "Malaysia",
    "Mexico",
    "Morocco",
    "Myanmar",
    "Nepal",
    "Netherlands",
    "New Zealand",
    "Nigeria",
    "Norway",
    "Oman",
    "Pakistan",
    "Peru",
    "Philippines",
    "Poland",
    "Portugal",
    "Qatar",
    "Romania",
    "Russia",
    "Saudi Arabia",
    "Singapore",
    "South Africa",
    "South Korea",
    "Spain",
    "Sri Lanka",
    "Sweden",
    "Switzerland",
    "Taiwan",
    "Thailand",
    "Turkey",
    "UAE",
    "UK",
    "Ukraine",
    "USA",
    "Vietnam",
    "Other",
];

/// Whether a country name is one of the form's choices.
pub fn is_known_country(name: &str) -> bool {
    COUNTRIES.contains(&name)
}
