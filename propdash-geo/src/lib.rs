//! District geometry and the join that paints aggregates onto it.
//!
//! Geometry is loaded once and never modified; each controller cycle produces
//! a fresh list of [`join::DistrictFeature`]s that point back into the
//! collection by index.
//!
//! Two join modes exist:
//! - **Direct**: each feature carries its own district code property.
//! - **Indirect**: each feature carries a planning-area name, and a
//!   [`lookup::DistrictLookup`] lists the planning areas inside each district.

pub mod join;
pub mod lookup;

use geojson::{FeatureCollection, GeoJson};

/// Parse a GeoJSON document that must be a `FeatureCollection`.
pub fn parse_feature_collection(geojson_str: &str) -> anyhow::Result<FeatureCollection> {
    let geojson: GeoJson = geojson_str.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;
    log::info!("geo: Parsed {} features", collection.features.len());
    Ok(collection)
}

/// Canonical form of a district code so "01", "1" and " 1 " join together.
pub fn district_key(code: &str) -> String {
    let trimmed = code.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let digits = trimmed.trim_start_matches('0');
        if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }
    } else {
        trimmed.to_string()
    }
}
