//! Dashboard settings.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use propdash_data::binning::DEFAULT_BIN_COUNT;
use propdash_geo::join::JoinMode;
use propdash_geo::lookup::DistrictLookup;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Feature property holding a district code (direct joins).
    pub district_property: String,
    /// Feature property holding a planning-area name (indirect joins).
    pub area_property: String,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            district_property: "district".to_string(),
            area_property: "planning_area".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Bins used by histograms that do not set their own count.
    pub histogram_bins: usize,
    pub join: JoinConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_BIN_COUNT,
            join: JoinConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Indirect when a lookup table is supplied, direct otherwise.
    pub fn join_mode(&self, lookup: Option<DistrictLookup>) -> JoinMode {
        match lookup {
            Some(lookup) => JoinMode::Indirect {
                area_property: self.join.area_property.clone(),
                lookup,
            },
            None => JoinMode::Direct {
                district_property: self.join.district_property.clone(),
            },
        }
    }
}
