use crate::district_key;
use crate::lookup::DistrictLookup;
use geojson::{Feature, FeatureCollection, JsonValue};
use serde::Serialize;
use std::collections::HashMap;

/// Property written onto exported features holding the resolved district code.
pub const DISTRICT_PROPERTY_OUT: &str = "postalDistrict";
/// Property written onto exported features holding the joined average.
pub const AVG_PRICE_PROPERTY_OUT: &str = "avgTransactedPrice";

/// How a feature finds its district.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinMode {
    /// The feature's own `district_property` is the district code.
    Direct { district_property: String },
    /// The feature's `area_property` names a planning area, resolved through `lookup`.
    Indirect {
        area_property: String,
        lookup: DistrictLookup,
    },
}

/// A geometry feature annotated with its district's statistic.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DistrictFeature {
    /// Position of the feature in the source collection.
    pub feature_index: usize,
    pub district_code: Option<String>,
    pub district_name: String,
    /// `None` when the district had no aggregate; renderers must not treat it as 0.
    pub avg_price: Option<f64>,
}

/// A feature whose key found no aggregate. Not fatal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JoinMiss {
    pub feature_index: usize,
    /// The key that was looked up, if the feature produced one at all.
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct JoinOutcome {
    pub features: Vec<DistrictFeature>,
    pub misses: Vec<JoinMiss>,
}

fn property_text(feature: &Feature, property: &str) -> Option<String> {
    match feature.property(property)? {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Join per-district averages onto features.
///
/// `district_averages` keys are district codes in any zero-padding; they are
/// canonicalized once here. In indirect mode the area-to-district index is
/// built once per call, not per feature.
pub fn join(features: &[Feature], district_averages: &HashMap<String, f64>, mode: &JoinMode) -> JoinOutcome {
    let averages: HashMap<String, f64> = district_averages
        .iter()
        .map(|(k, v)| (district_key(k), *v))
        .collect();

    let reverse_index: HashMap<String, String> = match mode {
        JoinMode::Indirect { lookup, .. } => lookup.reverse_index(),
        JoinMode::Direct { .. } => HashMap::new(),
    };

    let mut outcome = JoinOutcome {
        features: Vec::with_capacity(features.len()),
        misses: Vec::new(),
    };

    for (feature_index, feature) in features.iter().enumerate() {
        let (district_code, district_name) = match mode {
            JoinMode::Indirect { area_property, .. } => {
                let area = property_text(feature, area_property);
                let code = area
                    .as_deref()
                    .and_then(|a| DistrictLookup::resolve(&reverse_index, a))
                    .map(str::to_string);
                (code, area.unwrap_or_default())
            }
            JoinMode::Direct { district_property } => {
                let code = property_text(feature, district_property).map(|c| district_key(&c));
                let name = code
                    .as_ref()
                    .map(|c| format!("District {}", c))
                    .unwrap_or_default();
                (code, name)
            }
        };

        let avg_price = district_code.as_ref().and_then(|c| averages.get(c).copied());
        if avg_price.is_none() {
            log::debug!(
                "join: Feature {} ({}) has no aggregate for district {:?}",
                feature_index,
                district_name,
                district_code
            );
            outcome.misses.push(JoinMiss {
                feature_index,
                key: district_code.clone(),
            });
        }

        outcome.features.push(DistrictFeature {
            feature_index,
            district_code,
            district_name,
            avg_price,
        });
    }

    log::debug!(
        "join: {} of {} features matched an aggregate",
        outcome.features.len() - outcome.misses.len(),
        outcome.features.len()
    );
    outcome
}

/// Min and max of the joined averages (the colour-scale domain).
pub fn value_domain(features: &[DistrictFeature]) -> Option<(f64, f64)> {
    features
        .iter()
        .filter_map(|f| f.avg_price)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Copy of `collection` with the join written into each feature's properties.
pub fn annotate(collection: &FeatureCollection, joined: &[DistrictFeature]) -> FeatureCollection {
    let mut annotated = collection.clone();
    for district in joined {
        if let Some(feature) = annotated.features.get_mut(district.feature_index) {
            let code = district
                .district_code
                .clone()
                .map(JsonValue::String)
                .unwrap_or(JsonValue::Null);
            let price = district
                .avg_price
                .map(JsonValue::from)
                .unwrap_or(JsonValue::Null);
            feature.set_property(DISTRICT_PROPERTY_OUT, code);
            feature.set_property(AVG_PRICE_PROPERTY_OUT, price);
        }
    }
    annotated
}
