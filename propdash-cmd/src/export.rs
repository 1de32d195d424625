//! `summary` and `export`: run the dashboard headless and report what the
//! views would show.

use crate::filters::FilterArgs;
use crate::load::{load_sources, SourceArgs, Sources};
use anyhow::Context;
use propdash_dashboard::chart::{standard_charts, ChartData, ChartSpec, RenderMeta};
use propdash_dashboard::controller::{DashboardController, LoadReport};
use propdash_dashboard::options::FilterOptions;
use propdash_dashboard::view::View;
use propdash_data::kpi::KpiSummary;
use propdash_utils::numbers::format_thousands;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// The latest output of one view.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub spec: ChartSpec,
    pub data: ChartData,
    pub meta: RenderMeta,
}

type ChartSink = Rc<RefCell<BTreeMap<String, RenderedChart>>>;

/// A view that keeps its latest render instead of drawing it.
pub struct JsonView {
    name: String,
    spec: ChartSpec,
    sink: ChartSink,
}

impl View for JsonView {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    fn render(&mut self, data: &ChartData, meta: &RenderMeta) {
        self.sink.borrow_mut().insert(
            self.name.clone(),
            RenderedChart {
                spec: self.spec.clone(),
                data: data.clone(),
                meta: meta.clone(),
            },
        );
    }
}

/// A ready controller with the standard charts registered and the filter
/// flags applied.
pub struct Dashboard {
    pub controller: DashboardController,
    pub report: LoadReport,
    sink: ChartSink,
}

impl Dashboard {
    pub fn build(sources: Sources, filters: &FilterArgs) -> anyhow::Result<Dashboard> {
        let mut controller = DashboardController::new(sources.config);
        let report = controller.initialize(&sources.raw_rows, sources.geometry, sources.lookup)?;

        let sink: ChartSink = Rc::new(RefCell::new(BTreeMap::new()));
        for (name, spec) in standard_charts() {
            controller.register_view(Box::new(JsonView {
                name: name.to_string(),
                spec,
                sink: sink.clone(),
            }))?;
        }
        controller.mark_ready()?;

        let bounds = controller
            .options()
            .map(|o| o.tenure)
            .context("dashboard has no filter options after load")?;
        let update = filters.to_update(&bounds)?;
        if !update.is_empty() {
            controller.on_filter_change(update)?;
        }

        Ok(Dashboard {
            controller,
            report,
            sink,
        })
    }

    pub fn charts(&self) -> BTreeMap<String, RenderedChart> {
        self.sink.borrow().clone()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let kpis = self.controller.kpis();
        let mut lines = vec![
            format!("Load: {} ({} records kept)", self.report.summary, self.report.accepted),
            format!("Phase: {}", self.controller.phase()),
            format!("Records: {}", kpis.record_count),
            format!("Properties: {}", kpis.total_properties),
            format!("Revenue: {}", kpis.revenue_display),
        ];
        lines.push(match kpis.price_change_pct {
            Some(pct) => format!("Price change: {:+.1}%", pct),
            None => "Price change: n/a".to_string(),
        });
        lines.push(match &kpis.hottest_district {
            Some(stat) => format!(
                "Hottest district: {} (avg ${})",
                FilterOptions::district_label(&stat.district),
                format_thousands(stat.mean_price)
            ),
            None => "Hottest district: n/a".to_string(),
        });
        lines
    }

    pub fn export_document(&self, with_geometry: bool) -> anyhow::Result<serde_json::Value> {
        let geometry = if with_geometry {
            Some(serde_json::to_value(self.controller.annotated_geometry())?)
        } else {
            None
        };
        let document = ExportDocument {
            load: LoadSummary {
                accepted: self.report.accepted,
                rejected: self.report.rejected.len(),
                total_rows: self.report.total_rows,
                summary: &self.report.summary,
            },
            filters: serde_json::to_value(self.controller.filters())?,
            options: self.controller.options(),
            kpis: self.controller.kpis(),
            charts: self.charts(),
            geometry,
        };
        Ok(serde_json::to_value(document)?)
    }
}

#[derive(Serialize)]
struct LoadSummary<'a> {
    accepted: usize,
    rejected: usize,
    total_rows: usize,
    summary: &'a str,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    load: LoadSummary<'a>,
    filters: serde_json::Value,
    options: Option<&'a FilterOptions>,
    kpis: &'a KpiSummary,
    charts: BTreeMap<String, RenderedChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<serde_json::Value>,
}

async fn load_dashboard(sources: &SourceArgs, filters: &FilterArgs) -> anyhow::Result<Dashboard> {
    let loaded = load_sources(sources).await.map_err(|e| {
        log::error!("export: Load failed: {:#}", e);
        e
    })?;
    Dashboard::build(loaded, filters)
}

pub async fn run_summary(sources: &SourceArgs, filters: &FilterArgs) -> anyhow::Result<()> {
    let dashboard = load_dashboard(sources, filters).await?;
    for line in dashboard.summary_lines() {
        println!("{}", line);
    }
    Ok(())
}

pub async fn run_export(
    sources: &SourceArgs,
    filters: &FilterArgs,
    output: Option<&str>,
    with_geometry: bool,
) -> anyhow::Result<()> {
    let dashboard = load_dashboard(sources, filters).await?;
    let json = serde_json::to_string_pretty(&dashboard.export_document(with_geometry)?)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("writing {}", path))?;
            log::info!("export: Wrote {} charts to {}", dashboard.charts().len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdash_core::record::read_raw_records;
    use propdash_dashboard::config::DashboardConfig;
    use propdash_geo::lookup::DistrictLookup;
    use propdash_geo::parse_feature_collection;

    const CSV: &str = "\
Project Name,Postal District,Property Type,Type of Area,Floor Level,Area (SQFT),Area (SQM),Transacted Price ($),Unit Price ($ PSF),Unit Price ($ PSM),Sale Date,Tenure
ALPHA TOWER,1,Office,Strata,01 to 05,\"1,076\",100,\"1,000,000\",929,\"10,000\",Jan-23,Freehold
ALPHA TOWER,1,Office,Strata,06 to 10,\"1,076\",100,\"2,000,000\",\"1,858\",\"20,000\",Mar-24,99 yrs lease commencing from 2000
BETA POINT,9,Retail,Strata,-,538,50,\"3,000,000\",\"5,576\",\"60,000\",Feb-24,60 yrs lease commencing from 2000
BROKEN ROW,9,Retail,Strata,-,538,50,n/a,\"5,576\",\"60,000\",Feb-24,Freehold
";

    const AREAS_GEOJSON: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"planning_area":"Raffles Place"},"geometry":null},
        {"type":"Feature","properties":{"planning_area":"Orchard"},"geometry":null},
        {"type":"Feature","properties":{"planning_area":"Woodlands"},"geometry":null}
    ]}"#;

    const LOOKUP_JSON: &str = r#"{
        "01": {"General Location": ["Raffles Place", "Marina"]},
        "09": {"General Location": ["Orchard"]}
    }"#;

    fn sources() -> Sources {
        Sources {
            raw_rows: read_raw_records(CSV).unwrap(),
            geometry: parse_feature_collection(AREAS_GEOJSON).unwrap(),
            lookup: Some(DistrictLookup::from_json(LOOKUP_JSON).unwrap()),
            config: DashboardConfig::default(),
        }
    }

    #[test]
    fn test_summary_without_filters() {
        let dashboard = Dashboard::build(sources(), &FilterArgs::default()).unwrap();
        assert_eq!(dashboard.report.summary, "1 of 4 rows rejected");
        let lines = dashboard.summary_lines();
        assert!(lines.contains(&"Phase: ready".to_string()));
        assert!(lines.contains(&"Records: 3".to_string()));
        assert!(lines.contains(&"Properties: 2".to_string()));
        assert!(lines.contains(&"Revenue: $6 M".to_string()));
        assert!(lines.contains(&"Hottest district: District 9 (avg $3,000,000)".to_string()));
    }

    #[test]
    fn test_filters_reach_every_chart() {
        let filters = FilterArgs {
            property: Some("ALPHA TOWER".to_string()),
            ..Default::default()
        };
        let dashboard = Dashboard::build(sources(), &filters).unwrap();
        assert_eq!(dashboard.controller.kpis().record_count, 2);
        let charts = dashboard.charts();
        assert_eq!(charts.len(), 6);
        match &charts["property-type-donut"].data {
            ChartData::Categories(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].count, 2);
            }
            other => panic!("unexpected data {:?}", other),
        }
        match &charts["district-map"].data {
            ChartData::Districts(features) => {
                assert_eq!(features[0].avg_price, Some(1_500_000.0));
                assert_eq!(features[1].avg_price, None);
            }
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn test_export_document() {
        let dashboard = Dashboard::build(sources(), &FilterArgs::default()).unwrap();
        let document = dashboard.export_document(true).unwrap();
        assert_eq!(document["load"]["rejected"], 1);
        assert_eq!(document["kpis"]["record_count"], 3);
        assert_eq!(document["charts"]["sale-timeline"]["data"]["kind"], "series");
        assert_eq!(document["options"]["districts"][1], "9");
        let features = document["geometry"]["features"].as_array().unwrap();
        assert_eq!(features[1]["properties"]["avgTransactedPrice"], 3_000_000.0);
        assert!(features[2]["properties"]["avgTransactedPrice"].is_null());

        let without = dashboard.export_document(false).unwrap();
        assert!(without.get("geometry").is_none());
    }
}
