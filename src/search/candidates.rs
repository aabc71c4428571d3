//! Candidate generation: anchor points × rotations
//!
//! Candidate order is fixed: grid anchors by row (y ascending) then column
//! (x ascending), each with its rotations ascending, followed by
//! edge-hugging anchors for structures fixed to a parcel edge. The search
//! breaks score ties by this order.

use crate::core::config::EngineConfig;
use crate::core::error::{PlannerError, Result};
use crate::geometry::angle::{line_angle_deg, normalize_line_deg};
use crate::geometry::bounds::region_aabb;
use crate::geometry::ops::point_in_region;
use crate::geometry::Tolerance;
use crate::parcel::Parcel;
use crate::structures::{RotationPolicy, StructureSpec};
use geo::{Centroid, Coord};

/// A footprint center and rotation to try
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub anchor: Coord<f64>,
    pub rotation_deg: f64,
}

/// Lattice of anchor points inside the buildable region
///
/// Built once per run and shared by every ordering.
#[derive(Debug, Clone)]
pub struct AnchorGrid {
    resolution: f64,
    points: Vec<Coord<f64>>,
}

impl AnchorGrid {
    /// Lay a grid at the configured resolution over the buildable bounding
    /// box, starting at its minimum corner, and keep points inside the
    /// region (boundary included). A region too small to catch a lattice
    /// point falls back to its components' centroids.
    ///
    /// Fails when the lattice would exceed `max_anchor_points`.
    pub fn new(parcel: &Parcel, config: &EngineConfig) -> Result<Self> {
        let resolution = config.grid_resolution;
        let buildable = parcel.buildable();
        let tol = parcel.tolerance();
        let mut points = Vec::new();

        if let Some(bounds) = region_aabb(buildable) {
            let min = bounds.min();
            let cols = tol.lattice_steps(bounds.width(), resolution);
            let rows = tol.lattice_steps(bounds.height(), resolution);
            let lattice = cols.saturating_add(1).saturating_mul(rows.saturating_add(1));
            if lattice > config.max_anchor_points {
                return Err(PlannerError::InvalidConfig(format!(
                    "grid_resolution {} lays {} anchor points over the buildable region, above max_anchor_points {}",
                    resolution, lattice, config.max_anchor_points
                )));
            }
            for j in 0..=rows {
                for i in 0..=cols {
                    let p = Coord {
                        x: min.x + i as f64 * resolution,
                        y: min.y + j as f64 * resolution,
                    };
                    if point_in_region(p, buildable, tol) {
                        points.push(p);
                    }
                }
            }
        }

        if points.is_empty() {
            points = buildable
                .0
                .iter()
                .filter_map(|polygon| polygon.centroid().map(|c| c.0))
                .filter(|&c| point_in_region(c, buildable, tol))
                .collect();
        }

        Ok(Self { resolution, points })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rotations for structures that are not tied to an edge, ascending
pub fn rotations(policy: RotationPolicy, step_deg: f64, principal_axis_deg: f64) -> Vec<f64> {
    match policy {
        // Reported exactly as given, never normalised
        RotationPolicy::FixedAngle { degrees } => vec![degrees],
        RotationPolicy::FixedToParcelEdge => Vec::new(),
        RotationPolicy::Free => {
            let steps = (180.0 / step_deg - Tolerance::ANGLE_EPS_DEG).ceil().max(1.0) as usize;
            let mut angles: Vec<f64> = (0..steps).map(|k| k as f64 * step_deg).collect();
            let axis = normalize_line_deg(principal_axis_deg);
            let near = |a: f64, b: f64| (a - b).abs() <= Tolerance::ANGLE_EPS_DEG;
            if !angles.iter().any(|&a| near(a, axis) || near(a + 180.0, axis)) {
                angles.push(axis);
                angles.sort_by(|a, b| a.total_cmp(b));
            }
            angles
        }
    }
}

/// Anchors that sit a `width` × `depth` footprint flush against each
/// boundary edge, just inside that edge's setback and the boundary
/// clearance
pub fn edge_anchors(parcel: &Parcel, width: f64, depth: f64, boundary_clearance: f64, step: f64) -> Vec<Candidate> {
    let tol = parcel.tolerance();
    let mut anchors = Vec::new();

    for (i, (a, b)) in parcel.boundary().edges().enumerate() {
        let len = (b.x - a.x).hypot(b.y - a.y);
        if len + tol.eps() < width {
            continue;
        }
        let (ux, uy) = ((b.x - a.x) / len, (b.y - a.y) / len);
        // Left of a counter-clockwise edge is inside
        let (nx, ny) = (-uy, ux);
        let offset = parcel.setback(i).max(boundary_clearance) + depth / 2.0;
        let rotation_deg = line_angle_deg(a, b);

        let span = len - width;
        let steps = tol.lattice_steps(span, step);
        for k in 0..=steps {
            let t = width / 2.0 + k as f64 * step;
            anchors.push(Candidate {
                anchor: Coord {
                    x: a.x + ux * t + nx * offset,
                    y: a.y + uy * t + ny * offset,
                },
                rotation_deg,
            });
        }
    }
    anchors
}

/// Every candidate for one size tier of `spec`, in tie-break order
pub fn generate(
    spec: &StructureSpec,
    parcel: &Parcel,
    grid: &AnchorGrid,
    width: f64,
    depth: f64,
    config: &EngineConfig,
) -> Vec<Candidate> {
    match spec.rotation {
        RotationPolicy::FixedToParcelEdge => {
            let mut candidates: Vec<Candidate> = grid
                .points()
                .iter()
                .map(|&anchor| Candidate {
                    anchor,
                    rotation_deg: parcel.nearest_edge(anchor).1,
                })
                .collect();
            candidates.extend(edge_anchors(
                parcel,
                width,
                depth,
                spec.boundary_clearance,
                grid.resolution(),
            ));
            candidates
        }
        policy => {
            let angles = rotations(policy, config.rotation_step_deg, parcel.principal_axis_deg());
            let mut candidates = Vec::with_capacity(grid.len() * angles.len());
            for &anchor in grid.points() {
                for &rotation_deg in &angles {
                    candidates.push(Candidate {
                        anchor,
                        rotation_deg,
                    });
                }
            }
            candidates
        }
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
    fn test_grid_covers_buildable_inclusive() {
        let grid = AnchorGrid::new(&parcel(), &EngineConfig::default()).unwrap();
        // [3, 37] × [3, 27] at 1m: 35 × 25 points
        assert_eq!(grid.len(), 35 * 25);
        assert_eq!(grid.points()[0], Coord { x: 3.0, y: 3.0 });
        assert_eq!(grid.points()[1], Coord { x: 4.0, y: 3.0 });
        assert_eq!(grid.points()[35], Coord { x: 3.0, y: 4.0 });
    }

    #[test]
    fn test_oversized_lattice_rejected_before_allocation() {
        let config = EngineConfig {
            grid_resolution: 0.01,
            max_anchor_points: 10_000,
            ..EngineConfig::default()
        };
        // 3401 × 2401 lattice points over the 34 × 24 region
        assert!(matches!(
            AnchorGrid::new(&parcel(), &config),
            Err(PlannerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_free_rotations() {
        let angles = rotations(RotationPolicy::Free, 45.0, 0.0);
        assert_eq!(angles, vec![0.0, 45.0, 90.0, 135.0]);
        let with_axis = rotations(RotationPolicy::Free, 45.0, 30.0);
        assert_eq!(with_axis, vec![0.0, 30.0, 45.0, 90.0, 135.0]);
    }

    #[test]
    fn test_fixed_angle_kept_exact() {
        let angles = rotations(RotationPolicy::FixedAngle { degrees: 217.5 }, 15.0, 0.0);
        assert_eq!(angles, vec![217.5]);
    }

    #[test]
    fn test_edge_anchors_sit_inside_setback() {
        let parcel = parcel();
        let anchors = edge_anchors(&parcel, 6.0, 4.0, 0.0, 1.0);
        // Bottom edge: 40m long, 6m wide footprint => t in [3, 37]
        let bottom: Vec<_> = anchors
            .iter()
            .filter(|c| (c.anchor.y - 5.0).abs() < 1e-9 && c.rotation_deg.abs() < 1e-9)
            .collect();
        assert_eq!(bottom.len(), 35);
        assert!((bottom[0].anchor.x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_fixed_candidates_follow_nearest_edge() {
        let parcel = parcel();
        let grid = AnchorGrid::new(&parcel, &EngineConfig::default()).unwrap();
        let spec = StructureSpec::new("garage", 6.0, 6.0).with_rotation(RotationPolicy::FixedToParcelEdge);
        let candidates = generate(&spec, &parcel, &grid, 6.0, 6.0, &EngineConfig::default());
        assert!(candidates.len() > grid.len());
        // (3, 15) is nearest the left edge
        let left = candidates
            .iter()
            .find(|c| c.anchor == Coord { x: 3.0, y: 15.0 })
            .unwrap();
        assert!((left.rotation_deg - 90.0).abs() < 1e-9);
    }
}
