//! The controller that keeps every view in step with one shared filter state.
//!
//! Lifecycle: `Uninitialized -> Loaded -> Ready`, then `Ready -> Recomputing
//! -> Ready` once per filter change. A load that leaves no usable rows ends in
//! `Failed`, where every filter interaction is refused.

use crate::chart::{ChartContext, ChartData, ChartSpec, Measure, RenderMeta};
use crate::config::DashboardConfig;
use crate::options::FilterOptions;
use crate::view::View;
use geojson::FeatureCollection;
use propdash_core::filter::{FilterState, FilterUpdate};
use propdash_core::normalize::{normalize_all, RejectedRow};
use propdash_core::record::{CanonicalRecord, RawRecord};
use propdash_data::kpi::{summarize, KpiSummary};
use propdash_geo::join::{self, JoinMode};
use propdash_geo::lookup::DistrictLookup;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loaded,
    Ready,
    Recomputing,
    Failed(String),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Uninitialized => write!(f, "uninitialized"),
            Phase::Loaded => write!(f, "loaded"),
            Phase::Ready => write!(f, "ready"),
            Phase::Recomputing => write!(f, "recomputing"),
            Phase::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("dashboard is {phase}; filter interaction is not available")]
    NotReady { phase: Phase },
    #[error("dashboard is already initialized")]
    AlreadyInitialized,
    #[error("all {total} rows were rejected; nothing to show")]
    EmptyDataset { total: usize },
}

/// What the initial load kept and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: Vec<RejectedRow>,
    pub total_rows: usize,
    /// "N of M rows rejected"
    pub summary: String,
}

pub struct DashboardController {
    config: DashboardConfig,
    phase: Phase,
    dataset: Vec<CanonicalRecord>,
    geometry: FeatureCollection,
    join_mode: JoinMode,
    options: Option<FilterOptions>,
    initial_filters: FilterState,
    filters: FilterState,
    views: Vec<Box<dyn View>>,
    kpis: KpiSummary,
}

impl DashboardController {
    pub fn new(config: DashboardConfig) -> Self {
        let join_mode = config.join_mode(None);
        DashboardController {
            config,
            phase: Phase::Uninitialized,
            dataset: Vec::new(),
            geometry: FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            },
            join_mode,
            options: None,
            initial_filters: FilterState::default(),
            filters: FilterState::default(),
            views: Vec::new(),
            kpis: summarize::<CanonicalRecord>(&[]),
        }
    }

    /// Normalize the raw rows and take ownership of the dataset and geometry.
    ///
    /// Supplying a `lookup` selects the indirect (planning-area) join.
    pub fn initialize(
        &mut self,
        raw_rows: &[RawRecord],
        geometry: FeatureCollection,
        lookup: Option<DistrictLookup>,
    ) -> Result<LoadReport, DashboardError> {
        if self.phase != Phase::Uninitialized {
            return Err(DashboardError::AlreadyInitialized);
        }

        let normalized = normalize_all(raw_rows);
        let total_rows = normalized.total_rows();
        let summary = normalized.summary();
        if normalized.records.is_empty() {
            let error = DashboardError::EmptyDataset { total: total_rows };
            self.mark_failed(error.to_string());
            return Err(error);
        }

        let options = FilterOptions::from_records(&normalized.records);
        self.initial_filters = FilterState::with_tenure(options.tenure.full_range());
        self.filters = self.initial_filters.clone();
        self.join_mode = self.config.join_mode(lookup);
        self.kpis = summarize(&normalized.records);
        self.options = Some(options);
        self.geometry = geometry;
        self.dataset = normalized.records;

        log::info!(
            "controller: Loaded {} records and {} features ({})",
            self.dataset.len(),
            self.geometry.features.len(),
            summary
        );
        self.phase = Phase::Loaded;

        Ok(LoadReport {
            accepted: self.dataset.len(),
            rejected: normalized.rejected,
            total_rows,
            summary,
        })
    }

    /// Put the controller into the inert failed state, e.g. when a source
    /// could not be fetched at all. The dataset and views are dropped.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("controller: Load failed: {}", reason);
        self.dataset.clear();
        self.views.clear();
        self.options = None;
        self.phase = Phase::Failed(reason);
    }

    /// Attach a view and render it once with the current state.
    pub fn register_view(&mut self, mut view: Box<dyn View>) -> Result<(), DashboardError> {
        match self.phase {
            Phase::Loaded | Phase::Ready => {}
            _ => {
                return Err(DashboardError::NotReady {
                    phase: self.phase.clone(),
                })
            }
        }
        let filtered = self.filters.apply(&self.dataset);
        let ctx = ChartContext {
            dataset: &self.dataset,
            features: &self.geometry.features,
            join_mode: &self.join_mode,
            histogram_bins: self.config.histogram_bins,
        };
        let (data, meta) = view.spec().derive(&filtered, &ctx);
        view.render(&data, &meta);
        log::debug!("controller: Registered view {}", view.name());
        self.views.push(view);
        Ok(())
    }

    /// Enable filter interaction once every view has been registered.
    pub fn mark_ready(&mut self) -> Result<(), DashboardError> {
        match self.phase {
            Phase::Loaded => {
                log::info!("controller: Ready with {} views", self.views.len());
                self.phase = Phase::Ready;
                Ok(())
            }
            Phase::Ready => Ok(()),
            _ => Err(DashboardError::NotReady {
                phase: self.phase.clone(),
            }),
        }
    }

    /// Merge a partial update and run one full cycle: filter once, render
    /// every view exactly once, recompute the KPIs.
    pub fn on_filter_change(&mut self, update: FilterUpdate) -> Result<&KpiSummary, DashboardError> {
        self.require_ready()?;
        self.phase = Phase::Recomputing;
        self.filters.merge(update);
        self.recompute();
        self.phase = Phase::Ready;
        Ok(&self.kpis)
    }

    /// Restore the initial filters and run the same cycle.
    pub fn reset_filters(&mut self) -> Result<&KpiSummary, DashboardError> {
        self.require_ready()?;
        self.phase = Phase::Recomputing;
        self.filters = self.initial_filters.clone();
        self.recompute();
        self.phase = Phase::Ready;
        Ok(&self.kpis)
    }

    fn require_ready(&self) -> Result<(), DashboardError> {
        if self.phase == Phase::Ready {
            Ok(())
        } else {
            Err(DashboardError::NotReady {
                phase: self.phase.clone(),
            })
        }
    }

    fn recompute(&mut self) {
        let filtered = self.filters.apply(&self.dataset);
        let ctx = ChartContext {
            dataset: &self.dataset,
            features: &self.geometry.features,
            join_mode: &self.join_mode,
            histogram_bins: self.config.histogram_bins,
        };
        for view in self.views.iter_mut() {
            let (data, meta) = view.spec().derive(&filtered, &ctx);
            view.render(&data, &meta);
        }
        self.kpis = summarize(&filtered);
        log::debug!(
            "controller: {} of {} records pass, rendered {} views",
            filtered.len(),
            self.dataset.len(),
            self.views.len()
        );
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn options(&self) -> Option<&FilterOptions> {
        self.options.as_ref()
    }

    pub fn kpis(&self) -> &KpiSummary {
        &self.kpis
    }

    pub fn dataset(&self) -> &[CanonicalRecord] {
        &self.dataset
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Records passing the current filters.
    pub fn filtered(&self) -> Vec<&CanonicalRecord> {
        self.filters.apply(&self.dataset)
    }

    /// Derive a chart outside the render cycle, against the current filters.
    pub fn chart(&self, spec: &ChartSpec) -> (ChartData, RenderMeta) {
        let filtered = self.filtered();
        let ctx = ChartContext {
            dataset: &self.dataset,
            features: &self.geometry.features,
            join_mode: &self.join_mode,
            histogram_bins: self.config.histogram_bins,
        };
        spec.derive(&filtered, &ctx)
    }

    /// The geometry with the current per-district mean written into each
    /// feature. The mean follows the first registered choropleth view, or
    /// transacted price when there is none.
    pub fn annotated_geometry(&self) -> FeatureCollection {
        let spec = self
            .views
            .iter()
            .map(|view| view.spec())
            .find(|spec| matches!(spec, ChartSpec::Choropleth { .. }))
            .cloned()
            .unwrap_or(ChartSpec::Choropleth {
                measure: Measure::TransactedPrice,
            });
        match self.chart(&spec) {
            (ChartData::Districts(features), _) => join::annotate(&self.geometry, &features),
            _ => self.geometry.clone(),
        }
    }
}
