//! Placements and layouts: the output side of a planning run

pub mod report;
pub mod scorer;

pub use report::{EnergyInput, PlanReport};
pub use scorer::{LayoutScore, LayoutScorer, ScoringWeights};

use crate::core::config::EngineConfig;
use crate::geometry::bounds::rectangle;
use crate::geometry::SitePolygon;
use crate::parcel::Parcel;
use crate::solar::SolarScore;
use crate::structures::{AdjacencyPreference, RotationPolicy, StructureKind, StructureSpec};
use crate::validation::{AdjacencyStatus, ConstraintValidator, Rejection, RejectionKind};
use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One structure positioned on the parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub spec_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StructureKind>,
    /// Footprint centroid
    pub anchor: [f64; 2],
    /// Counter-clockwise from the local +x axis, degrees
    pub rotation_deg: f64,
    pub width: f64,
    pub depth: f64,
    pub footprint: SitePolygon,
    pub solar: SolarScore,
    pub adjacency: AdjacencyStatus,
    /// Objective value the search committed this placement with
    pub candidate_score: f64,
    pub structure_clearance: f64,
    pub boundary_clearance: f64,
    pub rotation_policy: RotationPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacency_preference: Option<AdjacencyPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Placement {
    /// Unscored placement of `spec` at `anchor` with the given size and
    /// rotation
    pub fn new(spec: &StructureSpec, anchor: [f64; 2], rotation_deg: f64, width: f64, depth: f64) -> Self {
        let center = Coord {
            x: anchor[0],
            y: anchor[1],
        };
        Self {
            spec_id: spec.id.clone(),
            kind: spec.kind,
            anchor,
            rotation_deg,
            width,
            depth,
            footprint: SitePolygon::from_trusted(rectangle(center, width, depth, rotation_deg)),
            solar: SolarScore {
                score: 0.0,
                facade_azimuth_deg: 0.0,
                alignment: 0.0,
            },
            adjacency: AdjacencyStatus::NotRequested,
            candidate_score: 0.0,
            structure_clearance: spec.structure_clearance,
            boundary_clearance: spec.boundary_clearance,
            rotation_policy: spec.rotation,
            adjacency_preference: spec.adjacency.clone(),
            height: spec.height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.depth
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: self.anchor[0],
            y: self.anchor[1],
        }
    }

    /// Same structure in the same place, ignoring scores
    pub fn same_position(&self, other: &Placement) -> bool {
        self.spec_id == other.spec_id
            && self.anchor == other.anchor
            && self.rotation_deg == other.rotation_deg
            && self.width == other.width
            && self.depth == other.depth
    }
}

/// A requested structure the search could not place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibleStructure {
    pub spec_id: String,
    pub reason: RejectionKind,
    /// Candidates rejected by the validator before giving up
    pub rejected_candidates: usize,
    pub mandatory: bool,
}

/// Area accounting for a layout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSummary {
    /// Total footprint area (m²)
    pub built_area: f64,
    /// Built area over parcel area
    pub lot_coverage: f64,
    /// Buildable area left free (m²)
    pub usable_yard_area: f64,
}

/// A placement that fails re-validation against the rest of its layout
#[derive(Debug, Clone, PartialEq, Error)]
#[error("placement '{spec_id}' is invalid: {rejection}")]
pub struct LayoutViolation {
    pub spec_id: String,
    pub rejection: Rejection,
}

/// The result of one ordering's search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Name of the ordering strategy that produced it
    pub ordering: String,
    /// Index of that strategy in the run; breaks ranking ties
    pub generation: usize,
    pub placements: Vec<Placement>,
    pub infeasible: Vec<InfeasibleStructure>,
    /// Number of structures requested
    pub requested: usize,
    pub budget_truncated: bool,
    pub candidates_evaluated: usize,
    pub score: LayoutScore,
    pub summary: LayoutSummary,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Layout {
    pub fn new(ordering: impl Into<String>, generation: usize, requested: usize) -> Self {
        Self {
            ordering: ordering.into(),
            generation,
            placements: Vec::new(),
            infeasible: Vec::new(),
            requested,
            budget_truncated: false,
            candidates_evaluated: 0,
            score: LayoutScore::default(),
            summary: LayoutSummary::default(),
            notes: Vec::new(),
        }
    }

    pub fn placement(&self, spec_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.spec_id == spec_id)
    }

    /// Fraction of requested structures that were placed; 1.0 when nothing
    /// was requested
    pub fn fraction_placed(&self) -> f64 {
        if self.requested == 0 {
            1.0
        } else {
            self.placements.len() as f64 / self.requested as f64
        }
    }

    /// Did every mandatory structure get placed?
    pub fn mandatory_satisfied(&self) -> bool {
        self.infeasible.iter().all(|i| !i.mandatory)
    }

    /// Same placements in the same order, ignoring scores and provenance
    pub fn same_arrangement(&self, other: &Layout) -> bool {
        self.placements.len() == other.placements.len()
            && self
                .placements
                .iter()
                .zip(&other.placements)
                .all(|(a, b)| a.same_position(b))
    }

    /// Recompute area accounting against the parcel
    pub fn summarize(&mut self, parcel: &Parcel) {
        let built_area: f64 = self.placements.iter().map(|p| p.footprint.area()).sum();
        self.summary = LayoutSummary {
            built_area,
            lot_coverage: built_area / parcel.parcel_area(),
            usable_yard_area: (parcel.buildable_area() - built_area).max(0.0),
        };
    }

    /// Re-run the validator over every placement against all the others
    pub fn verify(&self, parcel: &Parcel, config: &EngineConfig) -> Result<(), LayoutViolation> {
        let validator = ConstraintValidator::new(parcel, config);
        for (i, placement) in self.placements.iter().enumerate() {
            let others: Vec<Placement> = self
                .placements
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, p)| p.clone())
                .collect();
            validator
                .check(placement, &others)
                .map_err(|rejection| LayoutViolation {
                    spec_id: placement.spec_id.clone(),
                    rejection,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::{ParcelInput, Setbacks};

    fn parcel() -> Parcel {
        Parcel::build(
            &ParcelInput::rectangle(40.0, 30.0, 40.0),
            &Setbacks::uniform(3.0),
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_placement_footprint_matches_dimensions() {
        let spec = StructureSpec::new("home", 10.0, 8.0);
        let placement = Placement::new(&spec, [8.0, 7.0], 0.0, 10.0, 8.0);
        assert!((placement.footprint.area() - 80.0).abs() < 1e-9);
        let c = placement.footprint.centroid();
        assert!((c.x - 8.0).abs() < 1e-9 && (c.y - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_verify_detects_overlap() {
        let parcel = parcel();
        let config = EngineConfig::default();
        let a = StructureSpec::new("a", 6.0, 6.0);
        let b = StructureSpec::new("b", 6.0, 6.0);

        let mut layout = Layout::new("manual", 0, 2);
        layout.placements.push(Placement::new(&a, [10.0, 10.0], 0.0, 6.0, 6.0));
        layout.placements.push(Placement::new(&b, [20.0, 10.0], 0.0, 6.0, 6.0));
        assert!(layout.verify(&parcel, &config).is_ok());

        layout.placements[1] = Placement::new(&b, [12.0, 10.0], 0.0, 6.0, 6.0);
        let violation = layout.verify(&parcel, &config).unwrap_err();
        assert_eq!(violation.spec_id, "a");
        assert_eq!(violation.rejection.kind(), RejectionKind::ClearanceViolation);
    }

    #[test]
    fn test_summary() {
        let parcel = parcel();
        let spec = StructureSpec::new("a", 10.0, 8.0);
        let mut layout = Layout::new("manual", 0, 2);
        layout.placements.push(Placement::new(&spec, [8.0, 7.0], 0.0, 10.0, 8.0));
        layout.summarize(&parcel);
        assert!((layout.summary.built_area - 80.0).abs() < 1e-9);
        assert!((layout.summary.lot_coverage - 80.0 / 1200.0).abs() < 1e-12);
        assert!((layout.summary.usable_yard_area - 736.0).abs() < 1e-6);
        assert_eq!(layout.fraction_placed(), 0.5);
    }
}
