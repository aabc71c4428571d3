//! Plan report: what a planning run hands back to its caller

use super::Layout;
use crate::core::error::Result;
use crate::structures::StructureKind;
use serde::{Deserialize, Serialize};

/// Per-placement inputs for downstream energy estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyInput {
    pub spec_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StructureKind>,
    pub solar_score: f64,
    pub facade_azimuth_deg: f64,
    pub rotation_deg: f64,
    pub footprint_area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Ranked layouts for one request, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub layouts: Vec<Layout>,
    /// Orderings searched, including those dropped from `layouts`
    pub orderings_tried: usize,
    pub parcel_area: f64,
    pub buildable_area: f64,
    /// Share of the year's sunlight arriving from the equator side
    pub seasonal_factor: f64,
    pub equator_azimuth_deg: f64,
}

impl PlanReport {
    pub fn best(&self) -> Option<&Layout> {
        self.layouts.first()
    }

    /// Energy inputs for the best layout's placements
    pub fn energy_inputs(&self) -> Vec<EnergyInput> {
        self.best()
            .map(|layout| {
                layout
                    .placements
                    .iter()
                    .map(|p| EnergyInput {
                        spec_id: p.spec_id.clone(),
                        kind: p.kind,
                        solar_score: p.solar.score,
                        facade_azimuth_deg: p.solar.facade_azimuth_deg,
                        rotation_deg: p.rotation_deg,
                        footprint_area: p.footprint.area(),
                        height: p.height,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}
