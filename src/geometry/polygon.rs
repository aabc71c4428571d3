//! Validated simple polygons
//!
//! `SitePolygon` is the only way external coordinates enter the kernel. Its
//! constructor enforces the invariants the rest of the engine relies on:
//! at least three distinct vertices, finite coordinates, non-zero area, no
//! self-intersection, counter-clockwise winding. "Distinct", "zero" and
//! "touching" are judged with a [`Tolerance`] scaled to the vertex extent.

use super::ops::{orient, point_distance, segment_distance};
use super::Tolerance;
use geo::{Area, Centroid};
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a vertex list was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolygonError {
    #[error("polygon needs at least 3 distinct vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("polygon has zero area")]
    Degenerate,

    #[error("polygon edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },
}

/// A simple, counter-clockwise polygon without holes
///
/// Serializes as a plain list of `[x, y]` vertices (open ring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct SitePolygon {
    polygon: Polygon<f64>,
}

impl SitePolygon {
    /// Validate a list of `[x, y]` vertices with the default relative
    /// tolerance
    pub fn new(vertices: &[[f64; 2]]) -> Result<Self, PolygonError> {
        Self::with_tolerance(vertices, Tolerance::DEFAULT_RELATIVE)
    }

    /// Validate a list of `[x, y]` vertices
    ///
    /// `relative` is scaled by the larger side of the vertices' bounding box.
    /// A repeated closing vertex and consecutive vertices within tolerance
    /// are dropped. Clockwise input is reversed.
    pub fn with_tolerance(vertices: &[[f64; 2]], relative: f64) -> Result<Self, PolygonError> {
        if let Some(index) = vertices
            .iter()
            .position(|[x, y]| !x.is_finite() || !y.is_finite())
        {
            return Err(PolygonError::NonFinite { index });
        }
        let raw: Vec<Coord<f64>> = vertices.iter().map(|&[x, y]| Coord { x, y }).collect();
        let tol = Tolerance::for_extent(relative, coord_extent(&raw));

        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(raw.len());
        for c in raw {
            if coords.last().map_or(true, |&last| point_distance(last, c) > tol.eps()) {
                coords.push(c);
            }
        }
        while coords.len() > 1
            && point_distance(coords[0], coords[coords.len() - 1]) <= tol.eps()
        {
            coords.pop();
        }
        Self::validate(coords, &tol)
    }

    fn validate(mut coords: Vec<Coord<f64>>, tol: &Tolerance) -> Result<Self, PolygonError> {
        if coords.len() < 3 {
            return Err(PolygonError::TooFewVertices {
                count: coords.len(),
            });
        }

        let signed = shoelace(&coords);
        if !signed.is_finite() || signed.abs() <= tol.area_eps() {
            return Err(PolygonError::Degenerate);
        }

        if let Some((first, second)) = find_self_intersection(&coords, tol) {
            return Err(PolygonError::SelfIntersecting { first, second });
        }

        if signed < 0.0 {
            coords.reverse();
        }

        Ok(Self {
            polygon: Polygon::new(LineString::from(coords), vec![]),
        })
    }

    /// Wrap a polygon the caller has constructed to be simple (rectangles,
    /// regular polygons)
    pub(crate) fn from_trusted(polygon: Polygon<f64>) -> Self {
        Self { polygon }
    }

    pub fn as_geo(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Vertices of the open ring, counter-clockwise
    pub fn vertices(&self) -> &[Coord<f64>] {
        let ring = &self.polygon.exterior().0;
        &ring[..ring.len().saturating_sub(1)]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    /// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping)
    pub fn edge(&self, index: usize) -> (Coord<f64>, Coord<f64>) {
        let verts = self.vertices();
        let n = verts.len();
        (verts[index % n], verts[(index + 1) % n])
    }

    pub fn edges(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        (0..self.vertex_count()).map(move |i| self.edge(i))
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    pub fn centroid(&self) -> Coord<f64> {
        self.polygon
            .centroid()
            .map(|p| p.0)
            .unwrap_or_else(|| self.vertices()[0])
    }

    /// Vertices as `[x, y]` pairs (open ring)
    pub fn to_vertices(&self) -> Vec<[f64; 2]> {
        self.vertices().iter().map(|c| [c.x, c.y]).collect()
    }
}

impl TryFrom<Vec<[f64; 2]>> for SitePolygon {
    type Error = PolygonError;

    fn try_from(vertices: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Self::new(&vertices)
    }
}

impl From<SitePolygon> for Vec<[f64; 2]> {
    fn from(polygon: SitePolygon) -> Self {
        polygon.to_vertices()
    }
}

/// Signed area of a raw vertex list: positive when counter-clockwise
///
/// Lets callers learn the input winding before [`SitePolygon::new`]
/// normalises it.
pub fn signed_area(vertices: &[[f64; 2]]) -> f64 {
    let coords: Vec<Coord<f64>> = vertices.iter().map(|&[x, y]| Coord { x, y }).collect();
    shoelace(&coords)
}

/// Signed area via the shoelace formula: positive = counter-clockwise
fn shoelace(coords: &[Coord<f64>]) -> f64 {
    let n = coords.len();
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += coords[i].x * coords[j].y - coords[j].x * coords[i].y;
    }
    sum / 2.0
}

/// Larger side of the coordinates' bounding box
fn coord_extent(coords: &[Coord<f64>]) -> f64 {
    let (mut min, mut max) = (Coord { x: f64::MAX, y: f64::MAX }, Coord { x: f64::MIN, y: f64::MIN });
    for c in coords {
        min = Coord { x: min.x.min(c.x), y: min.y.min(c.y) };
        max = Coord { x: max.x.max(c.x), y: max.y.max(c.y) };
    }
    (max.x - min.x).max(max.y - min.y)
}

/// First pair of edges that come within `eps` of each other, other than
/// adjacent edges meeting at their shared vertex
fn find_self_intersection(coords: &[Coord<f64>], tol: &Tolerance) -> Option<(usize, usize)> {
    let n = coords.len();

    for i in 0..n {
        // Adjacent edges folding back onto each other form a zero-width spike
        let prev = coords[(i + n - 1) % n];
        let cur = coords[i];
        let next = coords[(i + 1) % n];
        let dot = (cur.x - prev.x) * (next.x - cur.x) + (cur.y - prev.y) * (next.y - cur.y);
        let offset = orient(prev, cur, next).abs() / point_distance(prev, cur);
        if tol.is_zero(offset) && dot < 0.0 {
            return Some(((i + n - 1) % n, i));
        }
    }

    if n < 4 {
        return None;
    }

    for i in 0..n {
        let a1 = coords[i];
        let a2 = coords[(i + 1) % n];

        for j in (i + 2)..n {
            // Skip the edge sharing vertex 0 with edge 0
            if i == 0 && j == n - 1 {
                continue;
            }

            let b1 = coords[j];
            let b2 = coords[(j + 1) % n];

            if tol.is_zero(segment_distance(a1, a2, b1, b2)) {
                return Some((i, j));
            }
        }
    }
    None
}
