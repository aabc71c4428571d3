//! Constraint validation for candidate placements
//!
//! Hard constraints short-circuit in a fixed order and produce a
//! [`Rejection`]. Adjacency is soft: it never rejects, it is measured and
//! reported in the [`Verdict`].

use crate::core::config::EngineConfig;
use crate::geometry::angle::line_angle_diff_deg;
use crate::geometry::bounds::{aabb, rects_overlap};
use crate::geometry::ops::{interiors_overlap, polygon_distance, polygon_line_distance, polygon_within};
use crate::geometry::Tolerance;
use crate::layout::Placement;
use crate::parcel::Parcel;
use crate::structures::RotationPolicy;
use geo::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a candidate or structure was turned down
///
/// Declaration order is check order; ties in rejection tallies resolve to
/// the earlier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    OutsideBuildableRegion,
    IntersectsExclusion,
    ClearanceViolation,
    MisalignedWithEdge,
    LotCoverageExceeded,
    /// Minimum footprint larger than the whole buildable area
    FootprintExceedsBuildableArea,
    /// No anchor or rotation produced a candidate at all
    NoCandidates,
    /// Search stopped before this structure was tried
    BudgetExhausted,
}

impl RejectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionKind::OutsideBuildableRegion => "outside_buildable_region",
            RejectionKind::IntersectsExclusion => "intersects_exclusion",
            RejectionKind::ClearanceViolation => "clearance_violation",
            RejectionKind::MisalignedWithEdge => "misaligned_with_edge",
            RejectionKind::LotCoverageExceeded => "lot_coverage_exceeded",
            RejectionKind::FootprintExceedsBuildableArea => "footprint_exceeds_buildable_area",
            RejectionKind::NoCandidates => "no_candidates",
            RejectionKind::BudgetExhausted => "budget_exhausted",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed hard constraint, with the measurements behind it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("footprint leaves the buildable region")]
    OutsideBuildableRegion,

    #[error("footprint is {distance:.3}m from the parcel boundary, needs {required:.3}m")]
    BoundaryClearance { distance: f64, required: f64 },

    #[error("footprint overlaps exclusion '{id}'")]
    IntersectsExclusion { id: String },

    #[error("footprint is {distance:.3}m from '{other}', needs {required:.3}m")]
    ClearanceViolation {
        other: String,
        distance: f64,
        required: f64,
    },

    #[error("primary edge deviates {deviation_deg:.2}° from boundary edge {edge}")]
    MisalignedWithEdge { edge: usize, deviation_deg: f64 },

    #[error("lot coverage {coverage:.3} would exceed {limit:.3}")]
    LotCoverageExceeded { coverage: f64, limit: f64 },
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::OutsideBuildableRegion | Rejection::BoundaryClearance { .. } => {
                RejectionKind::OutsideBuildableRegion
            }
            Rejection::IntersectsExclusion { .. } => RejectionKind::IntersectsExclusion,
            Rejection::ClearanceViolation { .. } => RejectionKind::ClearanceViolation,
            Rejection::MisalignedWithEdge { .. } => RejectionKind::MisalignedWithEdge,
            Rejection::LotCoverageExceeded { .. } => RejectionKind::LotCoverageExceeded,
        }
    }
}

/// How well a placement meets its adjacency preference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdjacencyStatus {
    NotRequested,
    Satisfied {
        anchor: String,
        distance: f64,
    },
    Violated {
        anchor: String,
        distance: f64,
        max_distance: f64,
    },
    /// Neither a parcel anchor nor a placed structure has this name
    AnchorMissing { anchor: String },
}

impl AdjacencyStatus {
    /// Satisfaction in [0, 1]: 1 when met or not requested, `max / distance`
    /// when too far, 0 when the anchor does not exist
    pub fn satisfaction(&self) -> f64 {
        match self {
            AdjacencyStatus::NotRequested | AdjacencyStatus::Satisfied { .. } => 1.0,
            AdjacencyStatus::Violated {
                distance,
                max_distance,
                ..
            } => {
                if *distance > 0.0 {
                    (max_distance / distance).clamp(0.0, 1.0)
                } else {
                    1.0
                }
            }
            AdjacencyStatus::AnchorMissing { .. } => 0.0,
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self, AdjacencyStatus::NotRequested)
    }

    /// Distance beyond the preferred maximum, if any
    pub fn shortfall(&self) -> Option<f64> {
        match self {
            AdjacencyStatus::Violated {
                distance,
                max_distance,
                ..
            } => Some(distance - max_distance),
            _ => None,
        }
    }
}

/// Outcome of a passed check
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub adjacency: AdjacencyStatus,
}

/// Checks candidates against one parcel
#[derive(Debug, Clone, Copy)]
pub struct ConstraintValidator<'a> {
    parcel: &'a Parcel,
    edge_tolerance_deg: f64,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(parcel: &'a Parcel, config: &EngineConfig) -> Self {
        Self {
            parcel,
            edge_tolerance_deg: config.edge_alignment_tolerance_deg,
        }
    }

    fn tol(&self) -> &Tolerance {
        self.parcel.tolerance()
    }

    /// Run every check against the parcel and the already-committed
    /// placements. `committed` must not contain the candidate itself.
    pub fn check(&self, candidate: &Placement, committed: &[Placement]) -> Result<Verdict, Rejection> {
        self.check_region(candidate)?;
        self.check_exclusions(candidate)?;
        self.check_clearances(candidate, committed)?;
        self.check_alignment(candidate)?;
        self.check_coverage(candidate, committed)?;
        Ok(Verdict {
            adjacency: self.adjacency(candidate, committed),
        })
    }

    pub fn is_valid(&self, candidate: &Placement, committed: &[Placement]) -> bool {
        self.check(candidate, committed).is_ok()
    }

    fn check_region(&self, candidate: &Placement) -> Result<(), Rejection> {
        let footprint = candidate.footprint.as_geo();
        if !polygon_within(footprint, self.parcel.setback_region(), self.tol()) {
            return Err(Rejection::OutsideBuildableRegion);
        }

        let required = candidate.boundary_clearance;
        if !self.tol().is_zero(required) {
            let distance = polygon_line_distance(footprint, self.parcel.boundary().as_geo().exterior());
            if !self.tol().ge(distance, required) {
                return Err(Rejection::BoundaryClearance { distance, required });
            }
        }
        Ok(())
    }

    fn check_exclusions(&self, candidate: &Placement) -> Result<(), Rejection> {
        let footprint = candidate.footprint.as_geo();
        match self
            .parcel
            .exclusions()
            .iter()
            .find(|ex| interiors_overlap(footprint, ex.polygon.as_geo(), self.tol()))
        {
            Some(ex) => Err(Rejection::IntersectsExclusion { id: ex.id.clone() }),
            None => Ok(()),
        }
    }

    fn check_clearances(&self, candidate: &Placement, committed: &[Placement]) -> Result<(), Rejection> {
        let tol = self.tol();
        let footprint = candidate.footprint.as_geo();
        let bounds = aabb(footprint);

        for other in committed {
            let required = candidate.structure_clearance.max(other.structure_clearance);
            let other_fp = other.footprint.as_geo();

            if tol.is_zero(required) {
                if interiors_overlap(footprint, other_fp, tol) {
                    return Err(Rejection::ClearanceViolation {
                        other: other.spec_id.clone(),
                        distance: 0.0,
                        required,
                    });
                }
                continue;
            }

            // Boxes farther apart than the clearance cannot violate it
            if let (Some(a), Some(b)) = (bounds, aabb(other_fp)) {
                if !rects_overlap(&a, &b, required) {
                    continue;
                }
            }

            let distance = polygon_distance(footprint, other_fp, tol);
            if !tol.ge(distance, required) {
                return Err(Rejection::ClearanceViolation {
                    other: other.spec_id.clone(),
                    distance,
                    required,
                });
            }
        }
        Ok(())
    }

    fn check_alignment(&self, candidate: &Placement) -> Result<(), Rejection> {
        if candidate.rotation_policy != RotationPolicy::FixedToParcelEdge {
            return Ok(());
        }
        let center = Coord {
            x: candidate.anchor[0],
            y: candidate.anchor[1],
        };
        let (edge, edge_angle) = self.parcel.nearest_edge(center);
        let deviation_deg = line_angle_diff_deg(candidate.rotation_deg, edge_angle);
        if !Tolerance::angle_le(deviation_deg, self.edge_tolerance_deg) {
            return Err(Rejection::MisalignedWithEdge { edge, deviation_deg });
        }
        Ok(())
    }

    fn check_coverage(&self, candidate: &Placement, committed: &[Placement]) -> Result<(), Rejection> {
        let Some(limit) = self.parcel.max_lot_coverage() else {
            return Ok(());
        };
        let built: f64 = committed.iter().map(|p| p.footprint.area()).sum::<f64>()
            + candidate.footprint.area();
        let coverage = built / self.parcel.parcel_area();
        if coverage > limit + self.tol().area_eps() / self.parcel.parcel_area() {
            return Err(Rejection::LotCoverageExceeded { coverage, limit });
        }
        Ok(())
    }

    /// Measure the adjacency preference. Parcel anchors shadow structure ids
    /// of the same name.
    pub fn adjacency(&self, candidate: &Placement, committed: &[Placement]) -> AdjacencyStatus {
        let Some(pref) = &candidate.adjacency_preference else {
            return AdjacencyStatus::NotRequested;
        };
        let footprint = candidate.footprint.as_geo();

        let distance = if let Some(anchor) = self.parcel.anchor(&pref.anchor) {
            anchor.distance_to(footprint, self.tol())
        } else if let Some(other) = committed.iter().find(|p| p.spec_id == pref.anchor) {
            polygon_distance(footprint, other.footprint.as_geo(), self.tol())
        } else {
            return AdjacencyStatus::AnchorMissing {
                anchor: pref.anchor.clone(),
            };
        };

        if self.tol().le(distance, pref.max_distance) {
            AdjacencyStatus::Satisfied {
                anchor: pref.anchor.clone(),
                distance,
            }
        } else {
            AdjacencyStatus::Violated {
                anchor: pref.anchor.clone(),
                distance,
                max_distance: pref.max_distance,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::{AnchorInput, ExclusionInput, ExclusionKind, ParcelInput, SetbackRules, Setbacks};
    use crate::structures::StructureSpec;

    fn parcel_with(input: ParcelInput, setbacks: Setbacks) -> Parcel {
        Parcel::build(&input, &setbacks, &EngineConfig::default()).unwrap()
    }

    fn simple_parcel() -> Parcel {
        parcel_with(ParcelInput::rectangle(40.0, 30.0, 40.0), Setbacks::uniform(3.0))
    }

    fn place(spec: &StructureSpec, x: f64, y: f64, rotation: f64) -> Placement {
        Placement::new(spec, [x, y], rotation, spec.max_width, spec.max_depth)
    }

    #[test]
    fn test_kind_display_matches_serde() {
        let kind = RejectionKind::FootprintExceedsBuildableArea;
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            format!("\"{}\"", kind)
        );
    }

    #[test]
    fn test_inside_buildable_passes() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let spec = StructureSpec::new("home", 10.0, 8.0);
        let verdict = validator.check(&place(&spec, 8.0, 7.0, 0.0), &[]).unwrap();
        assert_eq!(verdict.adjacency, AdjacencyStatus::NotRequested);
    }

    #[test]
    fn test_touching_setback_line_is_inside() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let spec = StructureSpec::new("home", 10.0, 8.0);
        // Lower-left corner exactly on (3, 3)
        assert!(validator.is_valid(&place(&spec, 8.0, 7.0, 0.0), &[]));
        let outside = place(&spec, 7.5, 7.0, 0.0);
        assert_eq!(
            validator.check(&outside, &[]).unwrap_err().kind(),
            RejectionKind::OutsideBuildableRegion
        );
    }

    #[test]
    fn test_boundary_clearance() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let spec = StructureSpec::new("shed", 4.0, 4.0).with_clearances(0.0, 5.0);
        // 3m from the boundary: inside the setback region but too close
        let err = validator.check(&place(&spec, 5.0, 15.0, 0.0), &[]).unwrap_err();
        assert!(matches!(err, Rejection::BoundaryClearance { .. }));
        assert!(validator.is_valid(&place(&spec, 7.0, 15.0, 0.0), &[]));
    }

    #[test]
    fn test_exclusion_overlap() {
        let mut input = ParcelInput::rectangle(40.0, 30.0, 40.0);
        input.exclusions.push(ExclusionInput {
            id: "septic".into(),
            kind: ExclusionKind::Other,
            vertices: vec![[20.0, 10.0], [24.0, 10.0], [24.0, 14.0], [20.0, 14.0]],
        });
        let parcel = parcel_with(input, Setbacks::uniform(3.0));
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let spec = StructureSpec::new("home", 6.0, 6.0);
        let err = validator.check(&place(&spec, 21.0, 12.0, 0.0), &[]).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::IntersectsExclusion);
        // Sharing an edge with the exclusion is allowed
        assert!(validator.is_valid(&place(&spec, 17.0, 12.0, 0.0), &[]));
    }

    #[test]
    fn test_clearance_uses_larger_requirement() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let home = StructureSpec::new("home", 6.0, 6.0).with_clearances(3.0, 0.0);
        let shed = StructureSpec::new("shed", 4.0, 4.0);
        let committed = vec![place(&home, 10.0, 10.0, 0.0)];

        // Gap of 2m: shed wants 0 but home demands 3
        let err = validator.check(&place(&shed, 17.0, 10.0, 0.0), &committed).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::ClearanceViolation);
        assert!(validator.is_valid(&place(&shed, 18.0, 10.0, 0.0), &committed));
    }

    #[test]
    fn test_zero_clearance_allows_touching() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let patio = StructureSpec::new("patio", 4.0, 4.0);
        let deck = StructureSpec::new("deck", 4.0, 4.0);
        let committed = vec![place(&patio, 10.0, 10.0, 0.0)];
        assert!(validator.is_valid(&place(&deck, 14.0, 10.0, 0.0), &committed));
        assert!(!validator.is_valid(&place(&deck, 13.0, 10.0, 0.0), &committed));
    }

    #[test]
    fn test_edge_alignment() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let garage = StructureSpec::new("garage", 6.0, 6.0).with_rotation(RotationPolicy::FixedToParcelEdge);
        // Nearest edge is the left side (vertical)
        assert!(validator.is_valid(&place(&garage, 7.0, 15.0, 90.0), &[]));
        let err = validator.check(&place(&garage, 7.0, 15.0, 10.0), &[]).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::MisalignedWithEdge);
    }

    #[test]
    fn test_lot_coverage() {
        let rules = SetbackRules {
            jurisdiction: "tight".into(),
            front: 1.0,
            side: 1.0,
            rear: 1.0,
            frontage_edge: 0,
            max_lot_coverage: Some(0.1),
        };
        let parcel = parcel_with(
            ParcelInput::rectangle(40.0, 30.0, 40.0),
            Setbacks::Jurisdiction(rules),
        );
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        // 120 m² limit
        let first = StructureSpec::new("a", 10.0, 10.0);
        let second = StructureSpec::new("b", 5.0, 5.0);
        let committed = vec![place(&first, 10.0, 10.0, 0.0)];
        let err = validator.check(&place(&second, 30.0, 20.0, 0.0), &committed).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::LotCoverageExceeded);
    }

    #[test]
    fn test_adjacency_is_soft() {
        let mut input = ParcelInput::rectangle(40.0, 30.0, 40.0);
        input.anchors.push(AnchorInput {
            name: "street".into(),
            vertices: vec![[0.0, 0.0], [40.0, 0.0]],
            closed: false,
        });
        let parcel = parcel_with(input, Setbacks::uniform(3.0));
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let spec = StructureSpec::new("garage", 4.0, 4.0).with_adjacency("street", 3.0);

        // Bottom edge at y = 6: twice the preferred distance from the street
        let verdict = validator.check(&place(&spec, 10.0, 8.0, 0.0), &[]).unwrap();
        assert!((verdict.adjacency.satisfaction() - 0.5).abs() < 1e-9);
        assert!((verdict.adjacency.shortfall().unwrap() - 3.0).abs() < 1e-9);

        let near = validator.check(&place(&spec, 10.0, 5.0, 0.0), &[]).unwrap();
        assert!(matches!(near.adjacency, AdjacencyStatus::Satisfied { .. }));
    }

    #[test]
    fn test_adjacency_to_structure_and_missing() {
        let parcel = simple_parcel();
        let validator = ConstraintValidator::new(&parcel, &EngineConfig::default());
        let home = StructureSpec::new("home", 6.0, 6.0);
        let shed = StructureSpec::new("shed", 2.0, 2.0).with_adjacency("home", 3.0);
        let committed = vec![place(&home, 10.0, 10.0, 0.0)];

        let verdict = validator.check(&place(&shed, 16.0, 10.0, 0.0), &committed).unwrap();
        assert!(matches!(verdict.adjacency, AdjacencyStatus::Satisfied { .. }));

        let lonely = validator.check(&place(&shed, 16.0, 10.0, 0.0), &[]).unwrap();
        assert_eq!(lonely.adjacency.satisfaction(), 0.0);
    }
}
