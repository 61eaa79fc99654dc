use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::codes::{RATING_LABELS, UNRATED_KEY};

/// Persisted `eval_rating` for a structure without a structural evaluation.
pub const UNRATED: i8 = -1;

pub const REGION_ID_WIDTH: usize = 5;

/// Header row of the cleaned dataset, in [`BridgeRecord`] field order.
pub const CLEAN_COLUMNS: [&str; 25] = [
    "fips",
    "state_abv",
    "state_name",
    "latitude",
    "longitude",
    "route_type",
    "route_num",
    "feature_intersect",
    "owner",
    "year_built",
    "service_type",
    "bridge_material",
    "bridge_type",
    "appr_material",
    "appr_type",
    "num_span",
    "num_appr",
    "max_span",
    "bridge_length",
    "bridge_width",
    "eval_rating",
    "eval_rating_v",
    "deck_condition",
    "superstructure_condition",
    "substructure_condition",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RouteType {
    #[serde(rename = "Interstate highway")]
    Interstate,
    #[serde(rename = "U.S. numbered highway")]
    UsNumbered,
    #[serde(rename = "State highway")]
    State,
    #[serde(rename = "County highway")]
    County,
    #[serde(rename = "City street")]
    CityStreet,
    #[serde(rename = "Federal lands road")]
    FederalLands,
    #[serde(rename = "State lands road")]
    StateLands,
    #[serde(rename = "Other")]
    Other,
}

impl RouteType {
    pub const ALL: [RouteType; 8] = [
        RouteType::Interstate,
        RouteType::UsNumbered,
        RouteType::State,
        RouteType::County,
        RouteType::CityStreet,
        RouteType::FederalLands,
        RouteType::StateLands,
        RouteType::Other,
    ];

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(RouteType::Interstate),
            2 => Some(RouteType::UsNumbered),
            3 => Some(RouteType::State),
            4 => Some(RouteType::County),
            5 => Some(RouteType::CityStreet),
            6 => Some(RouteType::FederalLands),
            7 => Some(RouteType::StateLands),
            8 => Some(RouteType::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RouteType::Interstate => "Interstate highway",
            RouteType::UsNumbered => "U.S. numbered highway",
            RouteType::State => "State highway",
            RouteType::County => "County highway",
            RouteType::CityStreet => "City street",
            RouteType::FederalLands => "Federal lands road",
            RouteType::StateLands => "State lands road",
            RouteType::Other => "Other",
        }
    }

    /// Interstate, U.S. numbered, and State highways are the only route
    /// classes kept in the cleaned dataset.
    pub fn is_highway(self) -> bool {
        matches!(
            self,
            RouteType::Interstate | RouteType::UsNumbered | RouteType::State
        )
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RouteType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        RouteType::ALL
            .into_iter()
            .find(|route| route.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| anyhow!("Unknown route type '{trimmed}'"))
    }
}

/// A normalized highway bridge record, the unit every filter operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRecord {
    #[serde(rename = "fips")]
    pub region_id: String,
    #[serde(rename = "state_abv")]
    pub state_abbrev: String,
    pub state_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub route_type: RouteType,
    #[serde(rename = "route_num")]
    pub route_number: String,
    pub feature_intersect: String,
    pub owner: String,
    pub year_built: i32,
    pub service_type: String,
    pub bridge_material: String,
    pub bridge_type: String,
    #[serde(rename = "appr_material")]
    pub approach_material: String,
    #[serde(rename = "appr_type")]
    pub approach_type: String,
    #[serde(rename = "num_span")]
    pub num_spans: u32,
    #[serde(rename = "num_appr")]
    pub num_approach_spans: u32,
    #[serde(rename = "max_span")]
    pub max_span_length: f64,
    pub bridge_length: f64,
    pub bridge_width: f64,
    pub eval_rating: i8,
    #[serde(rename = "eval_rating_v")]
    pub eval_rating_verbose: String,
    #[serde(default)]
    pub deck_condition: Option<u8>,
    #[serde(default)]
    pub superstructure_condition: Option<u8>,
    #[serde(default)]
    pub substructure_condition: Option<u8>,
}

impl BridgeRecord {
    pub fn is_rated(&self) -> bool {
        self.eval_rating != UNRATED
    }

    /// Bubble size used by the per-record map view.
    pub fn marker_size(&self) -> f64 {
        self.bridge_length * 50.0
    }
}

/// Label for a persisted rating. `-1` and the internal unrated key `10` both
/// map to `"None"`; anything outside `-1..=10` has no label.
pub fn rating_label(rating: i8) -> Option<&'static str> {
    match rating {
        UNRATED => Some(RATING_LABELS[UNRATED_KEY]),
        0..=10 => RATING_LABELS.get(rating as usize).copied(),
        _ => None,
    }
}

/// Left-pads a region identifier with zeros to five characters.
pub fn pad_region_id(raw: &str) -> String {
    format!("{:0>width$}", raw.trim(), width = REGION_ID_WIDTH)
}
