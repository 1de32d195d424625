//! Declarative chart specs.
//!
//! A view states *what* it shows as a [`ChartSpec`]; the controller turns the
//! spec into [`ChartData`] from the current filtered set on every cycle.

use geojson::Feature;
use propdash_core::record::CanonicalRecord;
use propdash_data::aggregate::{count_by, mean_by, overall_mean, sort_descending, AggregateRow};
use propdash_data::binning::{binned_mean, value_domain, BinnedRow, Binning};
use propdash_data::timeline::{time_bucketed_mean, TimePoint};
use propdash_geo::join::{self, DistrictFeature, JoinMode};
use serde::Serialize;
use std::collections::HashMap;

/// A categorical column to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    ProjectName,
    PostalDistrict,
    PropertyType,
    AreaCategory,
    FloorLevel,
}

impl Dimension {
    pub fn key<'a>(&self, record: &'a CanonicalRecord) -> &'a str {
        match self {
            Dimension::ProjectName => &record.project_name,
            Dimension::PostalDistrict => &record.postal_district,
            Dimension::PropertyType => &record.property_type,
            Dimension::AreaCategory => &record.area_category,
            Dimension::FloorLevel => &record.floor_level,
        }
    }
}

/// A numeric column to average or bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measure {
    AreaSqft,
    AreaSqm,
    TransactedPrice,
    UnitPricePsf,
    UnitPricePsm,
}

impl Measure {
    pub fn value(&self, record: &CanonicalRecord) -> f64 {
        match self {
            Measure::AreaSqft => record.area_sqft,
            Measure::AreaSqm => record.area_sqm,
            Measure::TransactedPrice => record.transacted_price,
            Measure::UnitPricePsf => record.unit_price_psf,
            Measure::UnitPricePsm => record.unit_price_psm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartSpec {
    /// Record count per category (donuts).
    Count { dimension: Dimension },
    /// Mean of a measure per category (bars). Sorting is applied after aggregation.
    Mean {
        dimension: Dimension,
        measure: Measure,
        sort_descending: bool,
    },
    /// Mean of `measure` within equal-width bins of `bin_by`.
    /// `bins: None` uses the configured default.
    Histogram {
        bin_by: Measure,
        measure: Measure,
        bins: Option<usize>,
    },
    /// Mean of a measure per sale date.
    Timeline { measure: Measure },
    /// Mean of a measure per district, joined onto the geometry.
    Choropleth { measure: Measure },
}

/// Data handed to a renderer. Any variant may be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ChartData {
    Categories(Vec<AggregateRow>),
    Bins(Vec<BinnedRow>),
    Series(Vec<TimePoint>),
    Districts(Vec<DistrictFeature>),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Categories(rows) => rows.len(),
            ChartData::Bins(rows) => rows.len(),
            ChartData::Series(rows) => rows.len(),
            ChartData::Districts(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extra values some charts overlay on their data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderMeta {
    /// Mean of the chart's measure over the whole filtered set ("average line").
    pub overall_mean: Option<f64>,
    /// Min/max of joined district values, for the colour scale.
    pub value_domain: Option<(f64, f64)>,
    /// Features with no matching district aggregate.
    pub join_misses: usize,
}

/// What a chart needs besides the filtered records.
pub struct ChartContext<'a> {
    pub dataset: &'a [CanonicalRecord],
    pub features: &'a [Feature],
    pub join_mode: &'a JoinMode,
    pub histogram_bins: usize,
}

impl ChartSpec {
    pub fn derive(&self, filtered: &[&CanonicalRecord], ctx: &ChartContext<'_>) -> (ChartData, RenderMeta) {
        match self {
            ChartSpec::Count { dimension } => {
                let rows = count_by(filtered, |r| dimension.key(r).to_string());
                (ChartData::Categories(rows), RenderMeta::default())
            }
            ChartSpec::Mean {
                dimension,
                measure,
                sort_descending: sort,
            } => {
                let mut rows = mean_by(filtered, |r| dimension.key(r).to_string(), |r| measure.value(r));
                if *sort {
                    sort_descending(&mut rows);
                }
                let meta = RenderMeta {
                    overall_mean: overall_mean(filtered, |r| measure.value(r)),
                    ..Default::default()
                };
                (ChartData::Categories(rows), meta)
            }
            ChartSpec::Histogram { bin_by, measure, bins } => {
                // An empty selection still gets the full axis of the dataset
                let domain = if filtered.is_empty() {
                    value_domain(ctx.dataset.iter().map(|r| bin_by.value(r)))
                } else {
                    None
                };
                let binning = Binning::Uniform {
                    count: bins.unwrap_or(ctx.histogram_bins),
                    domain,
                };
                let rows = binned_mean(filtered, |r| bin_by.value(r), &binning, |r| measure.value(r));
                let meta = RenderMeta {
                    overall_mean: overall_mean(filtered, |r| measure.value(r)),
                    ..Default::default()
                };
                (ChartData::Bins(rows), meta)
            }
            ChartSpec::Timeline { measure } => {
                let series = time_bucketed_mean(filtered, |r| r.sale_date, |r| measure.value(r));
                (ChartData::Series(series), RenderMeta::default())
            }
            ChartSpec::Choropleth { measure } => {
                let averages: HashMap<String, f64> =
                    mean_by(filtered, |r| r.postal_district.clone(), |r| measure.value(r))
                        .into_iter()
                        .filter_map(|row| row.mean.map(|mean| (row.key, mean)))
                        .collect();
                let outcome = join::join(ctx.features, &averages, ctx.join_mode);
                let meta = RenderMeta {
                    value_domain: join::value_domain(&outcome.features),
                    join_misses: outcome.misses.len(),
                    ..Default::default()
                };
                (ChartData::Districts(outcome.features), meta)
            }
        }
    }
}

/// The charts of the standard dashboard layout, by name.
pub fn standard_charts() -> Vec<(&'static str, ChartSpec)> {
    vec![
        (
            "property-type-donut",
            ChartSpec::Count {
                dimension: Dimension::PropertyType,
            },
        ),
        (
            "area-type-donut",
            ChartSpec::Count {
                dimension: Dimension::AreaCategory,
            },
        ),
        (
            "floor-level-bar",
            ChartSpec::Mean {
                dimension: Dimension::FloorLevel,
                measure: Measure::UnitPricePsm,
                sort_descending: true,
            },
        ),
        (
            "area-price-histogram",
            ChartSpec::Histogram {
                bin_by: Measure::AreaSqm,
                measure: Measure::TransactedPrice,
                bins: None,
            },
        ),
        (
            "sale-timeline",
            ChartSpec::Timeline {
                measure: Measure::UnitPricePsm,
            },
        ),
        (
            "district-map",
            ChartSpec::Choropleth {
                measure: Measure::TransactedPrice,
            },
        ),
    ]
}
