//! Planning entry point
//!
//! A [`Planner`] validates its inputs, builds the run-scoped state (parcel,
//! solar evaluator, anchor grid) once, runs one greedy search per ordering
//! and ranks the resulting layouts.

use crate::core::config::EngineConfig;
use crate::core::error::{PlannerError, Result};
use crate::layout::{LayoutScorer, PlanReport};
use crate::parcel::{Parcel, ParcelInput, Setbacks};
use crate::search::{AnchorGrid, OrderingStrategy, PlacementSearch};
use crate::solar::SolarEvaluator;
use crate::structures::StructureSpec;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Everything one planning run needs, loadable from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub parcel: ParcelInput,
    pub setbacks: Setbacks,
    pub structures: Vec<StructureSpec>,
    #[serde(default)]
    pub config: EngineConfig,
}

impl PlanRequest {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Plan a request with its own configuration
pub fn plan(request: &PlanRequest) -> Result<PlanReport> {
    Planner::new(request.config.clone()).plan(&request.parcel, &request.setbacks, &request.structures)
}

pub struct Planner {
    config: EngineConfig,
}

impl Planner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Plan with the orderings named in the configuration
    pub fn plan(&self, parcel: &ParcelInput, setbacks: &Setbacks, specs: &[StructureSpec]) -> Result<PlanReport> {
        let strategies: Vec<Box<dyn OrderingStrategy>> =
            self.config.orderings.iter().map(|kind| kind.strategy()).collect();
        self.plan_with_strategies(parcel, setbacks, specs, &strategies)
    }

    /// Plan with caller-supplied orderings, one layout per strategy
    ///
    /// Layout generations follow the strategies' index order regardless of
    /// which search finishes first.
    pub fn plan_with_strategies(
        &self,
        parcel: &ParcelInput,
        setbacks: &Setbacks,
        specs: &[StructureSpec],
        strategies: &[Box<dyn OrderingStrategy>],
    ) -> Result<PlanReport> {
        let start = Instant::now();
        self.config.validate()?;
        if strategies.is_empty() {
            return Err(PlannerError::InvalidConfig(
                "at least one ordering is required".into(),
            ));
        }
        validate_specs(specs)?;

        let parcel = Parcel::build(parcel, setbacks, &self.config)?;
        let solar = SolarEvaluator::for_parcel(&parcel);
        let grid = AnchorGrid::new(&parcel, &self.config)?;
        if grid.is_empty() {
            warn!("Buildable region holds no anchor points");
        }
        info!(
            structures = specs.len(),
            orderings = strategies.len(),
            anchors = grid.len(),
            buildable_area = parcel.buildable_area(),
            budgeted = !self.config.budget.is_unlimited(),
            "Planning started"
        );

        let search = PlacementSearch::new(&parcel, &self.config, &solar, &grid);
        let layouts: Vec<_> = strategies
            .par_iter()
            .enumerate()
            .map(|(generation, strategy)| search.run(specs, strategy.as_ref(), generation))
            .collect();

        let scorer = LayoutScorer::new(&self.config, &solar, *parcel.tolerance());
        let layouts = scorer.select(layouts, self.config.top_n);

        if let Some(best) = layouts.first() {
            info!(
                ordering = %best.ordering,
                score = best.score.total,
                placed = best.placements.len(),
                requested = best.requested,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Planning complete"
            );
        }

        Ok(PlanReport {
            layouts,
            orderings_tried: strategies.len(),
            parcel_area: parcel.parcel_area(),
            buildable_area: parcel.buildable_area(),
            seasonal_factor: solar.seasonal_factor(),
            equator_azimuth_deg: solar.equator_azimuth_deg(),
        })
    }
}

/// Reject malformed or duplicate specs before any geometry is built
fn validate_specs(specs: &[StructureSpec]) -> Result<()> {
    let mut seen: AHashMap<&str, usize> = AHashMap::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        spec.validate()?;
        if let Some(first) = seen.insert(spec.id.as_str(), index) {
            return Err(PlannerError::InvalidStructureSpec {
                id: spec.id.clone(),
                reason: format!("duplicate id (also at index {})", first),
            });
        }
    }
    Ok(())
}
