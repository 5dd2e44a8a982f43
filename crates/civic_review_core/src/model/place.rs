//! Place hierarchy referenced by surveys.
//!
//! # Responsibility
//! - Mirror the country/region/city records owned by the geography
//!   gazetteer closely enough to enforce referential integrity.
//!
//! # Invariants
//! - Place ids are issued externally and never generated here.
//! - Deleting a place removes everything beneath it, including surveys.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Gazetteer identifier for a country, region or city.
pub type PlaceId = i64;

/// Level of a place in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Country,
    Region,
    City,
}

impl PlaceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Region => "region",
            Self::City => "city",
        }
    }
}

impl Display for PlaceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: PlaceId,
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
}

/// First-level subdivision (state, province, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: PlaceId,
    pub country_id: PlaceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: PlaceId,
    pub region_id: PlaceId,
    pub country_id: PlaceId,
    pub name: String,
}
