//! Parcel model: boundary, exclusions, anchors and the cached buildable region
//!
//! A [`Parcel`] is built once per request and never mutated. Everything the
//! search asks of it repeatedly (the buildable region, its area, the boundary
//! tolerance) is computed up front in [`Parcel::build`].

pub mod setback;

pub use setback::{SetbackRules, Setbacks, FEET_TO_METERS};

use crate::core::config::EngineConfig;
use crate::core::error::{PlannerError, Result};
use crate::geometry::angle::line_angle_deg;
use crate::geometry::bounds::{aabb, extent, principal_axis_deg};
use crate::geometry::buffer::inset;
use crate::geometry::ops::{
    point_in_polygon, point_polygon_distance, point_segment_distance, polygon_distance,
    polygon_line_distance,
};
use crate::geometry::{signed_area, SitePolygon, Tolerance};
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What an exclusion zone represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionKind {
    Easement,
    SetbackZone,
    ExistingStructure,
    #[default]
    Other,
}

/// An exclusion polygon as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionInput {
    pub id: String,
    #[serde(default)]
    pub kind: ExclusionKind,
    pub vertices: Vec<[f64; 2]>,
}

/// A named adjacency target as supplied by the caller
///
/// One vertex is a point, several an open path. `closed` turns three or more
/// vertices into an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorInput {
    pub name: String,
    pub vertices: Vec<[f64; 2]>,
    #[serde(default)]
    pub closed: bool,
}

/// Raw parcel description, validated by [`Parcel::build`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelInput {
    pub boundary: Vec<[f64; 2]>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionInput>,
    #[serde(default)]
    pub anchors: Vec<AnchorInput>,
    /// Degrees, positive north
    pub latitude: f64,
    /// Compass bearing (degrees clockwise from true north) of the local +y axis
    #[serde(default)]
    pub north_offset_deg: f64,
}

impl ParcelInput {
    /// Axis-aligned rectangular parcel with its corner at the origin
    pub fn rectangle(width: f64, depth: f64, latitude: f64) -> Self {
        Self {
            boundary: vec![[0.0, 0.0], [width, 0.0], [width, depth], [0.0, depth]],
            exclusions: Vec::new(),
            anchors: Vec::new(),
            latitude,
            north_offset_deg: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub id: String,
    pub kind: ExclusionKind,
    pub polygon: SitePolygon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorGeometry {
    Point(Coord<f64>),
    Path(LineString<f64>),
    Area(SitePolygon),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub name: String,
    pub geometry: AnchorGeometry,
}

impl Anchor {
    fn from_input(input: &AnchorInput, relative_tolerance: f64) -> Result<Self> {
        let invalid =
            |reason: String| PlannerError::InvalidParcelGeometry(format!("anchor '{}': {}", input.name, reason));

        if let Some(index) = input
            .vertices
            .iter()
            .position(|[x, y]| !x.is_finite() || !y.is_finite())
        {
            return Err(invalid(format!("vertex {} has a non-finite coordinate", index)));
        }

        let coords: Vec<Coord<f64>> = input.vertices.iter().map(|&[x, y]| Coord { x, y }).collect();
        let geometry = match coords.len() {
            0 => return Err(invalid("no vertices".into())),
            1 => AnchorGeometry::Point(coords[0]),
            n if input.closed && n >= 3 => AnchorGeometry::Area(
                SitePolygon::with_tolerance(&input.vertices, relative_tolerance)
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            _ => AnchorGeometry::Path(LineString::from(coords)),
        };
        Ok(Self {
            name: input.name.clone(),
            geometry,
        })
    }

    /// Distance from a footprint to this anchor; zero when they touch
    pub fn distance_to(&self, footprint: &Polygon<f64>, tol: &Tolerance) -> f64 {
        match &self.geometry {
            AnchorGeometry::Point(p) => point_polygon_distance(*p, footprint, tol),
            AnchorGeometry::Path(line) => {
                if line.0.iter().any(|&c| point_in_polygon(c, footprint, tol)) {
                    0.0
                } else {
                    polygon_line_distance(footprint, line)
                }
            }
            AnchorGeometry::Area(area) => polygon_distance(footprint, area.as_geo(), tol),
        }
    }
}

/// A validated parcel with its derived regions
#[derive(Debug, Clone)]
pub struct Parcel {
    boundary: SitePolygon,
    exclusions: Vec<Exclusion>,
    anchors: Vec<Anchor>,
    latitude: f64,
    north_offset_deg: f64,
    setbacks: Vec<f64>,
    max_lot_coverage: Option<f64>,
    setback_region: MultiPolygon<f64>,
    buildable: MultiPolygon<f64>,
    buildable_area: f64,
    principal_axis_deg: f64,
    tolerance: Tolerance,
}

impl Parcel {
    /// Validate the input and derive the buildable region
    ///
    /// Buildable region = boundary eroded by the per-edge setbacks, minus
    /// every exclusion zone.
    pub fn build(input: &ParcelInput, setbacks: &Setbacks, config: &EngineConfig) -> Result<Self> {
        if !input.latitude.is_finite() || input.latitude.abs() > 90.0 {
            return Err(PlannerError::InvalidParcelGeometry(format!(
                "latitude {} outside [-90, 90]",
                input.latitude
            )));
        }
        if !input.north_offset_deg.is_finite() {
            return Err(PlannerError::InvalidParcelGeometry(
                "north offset must be finite".into(),
            ));
        }

        let boundary = SitePolygon::with_tolerance(&input.boundary, config.tolerance)
            .map_err(|e| PlannerError::InvalidParcelGeometry(format!("boundary: {}", e)))?;
        if boundary.area() < config.min_parcel_area {
            return Err(PlannerError::InvalidParcelGeometry(format!(
                "boundary area {:.3} below minimum {}",
                boundary.area(),
                config.min_parcel_area
            )));
        }

        let bounds = aabb(boundary.as_geo()).ok_or_else(|| {
            PlannerError::InvalidParcelGeometry("boundary has no extent".into())
        })?;
        let tolerance = Tolerance::for_extent(config.tolerance, extent(&bounds));

        let input_was_clockwise = signed_area(&input.boundary) < 0.0;
        let resolved = setbacks.resolve(&boundary, input_was_clockwise)?;

        let exclusions = input
            .exclusions
            .iter()
            .map(|ex| {
                SitePolygon::with_tolerance(&ex.vertices, config.tolerance)
                    .map(|polygon| Exclusion {
                        id: ex.id.clone(),
                        kind: ex.kind,
                        polygon,
                    })
                    .map_err(|e| {
                        PlannerError::InvalidParcelGeometry(format!("exclusion '{}': {}", ex.id, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let anchors = input
            .anchors
            .iter()
            .map(|anchor| Anchor::from_input(anchor, config.tolerance))
            .collect::<Result<Vec<_>>>()?;

        let setback_region = inset(&boundary, &resolved, &tolerance);

        let mut buildable = setback_region.clone();
        for exclusion in &exclusions {
            buildable = buildable.difference(&MultiPolygon::new(vec![exclusion
                .polygon
                .as_geo()
                .clone()]));
        }
        let buildable = MultiPolygon::new(
            buildable
                .0
                .into_iter()
                .filter(|p| p.unsigned_area() > tolerance.area_eps())
                .collect(),
        );

        let buildable_area = buildable.unsigned_area();
        if buildable.0.is_empty() || buildable_area <= tolerance.area_eps() {
            return Err(PlannerError::NoBuildableArea);
        }

        let principal_axis_deg = principal_axis_deg(boundary.as_geo()).unwrap_or(0.0);

        debug!(
            parcel_area = boundary.area(),
            buildable_area,
            components = buildable.0.len(),
            exclusions = exclusions.len(),
            "Parcel built"
        );

        Ok(Self {
            boundary,
            exclusions,
            anchors,
            latitude: input.latitude,
            north_offset_deg: input.north_offset_deg,
            setbacks: resolved,
            max_lot_coverage: setbacks.max_lot_coverage(),
            setback_region,
            buildable,
            buildable_area,
            principal_axis_deg,
            tolerance,
        })
    }

    pub fn boundary(&self) -> &SitePolygon {
        &self.boundary
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn anchor(&self, name: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.name == name)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn north_offset_deg(&self) -> f64 {
        self.north_offset_deg
    }

    /// Resolved setback per boundary edge
    pub fn setbacks(&self) -> &[f64] {
        &self.setbacks
    }

    pub fn setback(&self, edge: usize) -> f64 {
        self.setbacks.get(edge).copied().unwrap_or(0.0)
    }

    pub fn max_lot_coverage(&self) -> Option<f64> {
        self.max_lot_coverage
    }

    /// Boundary eroded by setbacks, before exclusions are removed
    pub fn setback_region(&self) -> &MultiPolygon<f64> {
        &self.setback_region
    }

    pub fn buildable(&self) -> &MultiPolygon<f64> {
        &self.buildable
    }

    pub fn buildable_area(&self) -> f64 {
        self.buildable_area
    }

    pub fn parcel_area(&self) -> f64 {
        self.boundary.area()
    }

    /// Long-axis angle of the boundary's minimum rotated bounding box
    pub fn principal_axis_deg(&self) -> f64 {
        self.principal_axis_deg
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Boundary edge closest to `p`, with its undirected angle in [0, 180).
    /// Earlier edges win ties.
    pub fn nearest_edge(&self, p: Coord<f64>) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (i, (a, b)) in self.boundary.edges().enumerate() {
            let d = point_segment_distance(p, a, b);
            if d < best.1 - self.tolerance.eps() {
                best = (i, d);
            }
        }
        let (a, b) = self.boundary.edge(best.0);
        (best.0, line_angle_deg(a, b))
    }
}
