//! Inward buffering (erosion) of parcel boundaries
//!
//! The eroded region is the polygon minus everything within `d_i` of edge `i`.
//! That band is the union of one strip per edge plus, at reflex corners, a
//! disc covering the wedge the two strips leave open. Convex corners need no
//! disc: any interior point near the vertex is already near one of its edges.

use super::ops::orient;
use super::{SitePolygon, Tolerance};
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon, Winding};
use std::f64::consts::PI;

/// Segments used to approximate corner discs
const DISC_SEGMENTS: usize = 32;

/// Erode a polygon by a per-edge distance
///
/// `distances[i]` applies to edge `i` (vertex `i` to `i + 1`). All-zero
/// distances return the polygon unchanged. Slivers below the area tolerance
/// are dropped, so an empty result means nothing is left.
pub fn inset(polygon: &SitePolygon, distances: &[f64], tol: &Tolerance) -> MultiPolygon<f64> {
    let original = MultiPolygon::new(vec![polygon.as_geo().clone()]);
    if distances.iter().all(|d| tol.is_zero(*d)) {
        return original;
    }

    let verts = polygon.vertices();
    let n = verts.len();
    let distance = |i: usize| distances.get(i % n).copied().unwrap_or(0.0).max(0.0);

    let mut region = original;

    for i in 0..n {
        let d = distance(i);
        if tol.is_zero(d) {
            continue;
        }
        let strip = edge_strip(verts[i], verts[(i + 1) % n], d);
        region = region.difference(&MultiPolygon::new(vec![strip]));
    }

    for i in 0..n {
        let prev = verts[(i + n - 1) % n];
        let cur = verts[i];
        let next = verts[(i + 1) % n];
        // Counter-clockwise ring: a right turn is a reflex corner
        if orient(prev, cur, next) >= 0.0 {
            continue;
        }
        let radius = distance(i + n - 1).max(distance(i));
        if tol.is_zero(radius) {
            continue;
        }
        region = region.difference(&MultiPolygon::new(vec![disc(cur, radius)]));
    }

    MultiPolygon::new(
        region
            .0
            .into_iter()
            .filter(|p| p.unsigned_area() > tol.area_eps())
            .collect(),
    )
}

/// Erode a polygon by the same distance on every edge
pub fn inset_uniform(polygon: &SitePolygon, distance: f64, tol: &Tolerance) -> MultiPolygon<f64> {
    inset(polygon, &vec![distance; polygon.vertex_count()], tol)
}

/// Erode every component of a region, holes included, by `distance`
///
/// Holes grow by the same distance. A zero distance returns the region
/// unchanged.
pub fn inset_region(region: &MultiPolygon<f64>, distance: f64, tol: &Tolerance) -> MultiPolygon<f64> {
    if tol.is_zero(distance) {
        return region.clone();
    }
    let d = distance.max(0.0);
    let mut eroded = region.clone();

    for polygon in &region.0 {
        let rings = std::iter::once((polygon.exterior(), false))
            .chain(polygon.interiors().iter().map(|ring| (ring, true)));
        for (ring, is_hole) in rings {
            let verts = &ring.0[..ring.0.len().saturating_sub(1)];
            let n = verts.len();
            if n < 3 {
                continue;
            }
            // The polygon's interior lies left of an exterior wound
            // counter-clockwise, or of a hole wound clockwise
            let interior_left = ring.is_ccw() != is_hole;

            for i in 0..n {
                let strip = edge_strip(verts[i], verts[(i + 1) % n], d);
                eroded = eroded.difference(&MultiPolygon::new(vec![strip]));
            }
            for i in 0..n {
                let turn = orient(verts[(i + n - 1) % n], verts[i], verts[(i + 1) % n]);
                let reflex = if interior_left { turn < 0.0 } else { turn > 0.0 };
                if reflex {
                    eroded = eroded.difference(&MultiPolygon::new(vec![disc(verts[i], d)]));
                }
            }
        }
    }

    MultiPolygon::new(
        eroded
            .0
            .into_iter()
            .filter(|p| p.unsigned_area() > tol.area_eps())
            .collect(),
    )
}

/// Rectangle covering everything within `d` of segment a→b, on both sides
fn edge_strip(a: Coord<f64>, b: Coord<f64>, d: f64) -> Polygon<f64> {
    let len = (b.x - a.x).hypot(b.y - a.y);
    let nx = -(b.y - a.y) / len * d;
    let ny = (b.x - a.x) / len * d;
    Polygon::new(
        LineString::from(vec![
            Coord { x: a.x - nx, y: a.y - ny },
            Coord { x: b.x - nx, y: b.y - ny },
            Coord { x: b.x + nx, y: b.y + ny },
            Coord { x: a.x + nx, y: a.y + ny },
        ]),
        vec![],
    )
}

/// Regular polygon circumscribing a circle of `radius`
fn disc(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let circumradius = radius / (PI / DISC_SEGMENTS as f64).cos();
    let ring: Vec<Coord<f64>> = (0..DISC_SEGMENTS)
        .map(|k| {
            let theta = 2.0 * PI * k as f64 / DISC_SEGMENTS as f64;
            Coord {
                x: center.x + circumradius * theta.cos(),
                y: center.y + circumradius * theta.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}
