//! Predicates and measurements over polygons and regions
//!
//! Boundary policy: points on a boundary (within `Tolerance::eps`) are inside.
//! Two shapes that only share boundary do not overlap. Regions are
//! `MultiPolygon`s whose members may carry holes.

use super::bounds::{aabb, rects_overlap};
use super::Tolerance;
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};

/// Twice the signed area of triangle (a, b, c); positive when c is left of ab
#[inline]
pub fn orient(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Signed distance of `p` from the line through a→b
#[inline]
fn side(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    let len = (b.x - a.x).hypot(b.y - a.y);
    if len == 0.0 {
        0.0
    } else {
        orient(a, b, p) / len
    }
}

#[inline]
fn on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Exact test: do the closed segments share any point?
pub fn segments_touch(a1: Coord<f64>, a2: Coord<f64>, b1: Coord<f64>, b2: Coord<f64>) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Do the segments cross through each other's interiors by more than `eps`?
///
/// Touching, grazing and collinear overlap are not crossings.
pub fn segments_cross(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
    tol: &Tolerance,
) -> bool {
    let eps = tol.eps();
    let s1 = side(b1, b2, a1);
    let s2 = side(b1, b2, a2);
    let s3 = side(a1, a2, b1);
    let s4 = side(a1, a2, b2);

    ((s1 > eps && s2 < -eps) || (s1 < -eps && s2 > eps))
        && ((s3 > eps && s4 < -eps) || (s3 < -eps && s4 > eps))
}

pub fn point_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

pub fn point_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point_distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    point_distance(
        p,
        Coord {
            x: a.x + t * dx,
            y: a.y + t * dy,
        },
    )
}

pub fn segment_distance(a1: Coord<f64>, a2: Coord<f64>, b1: Coord<f64>, b2: Coord<f64>) -> f64 {
    if segments_touch(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

/// All edges of a closed ring
fn ring_edges(ring: &LineString<f64>) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
    ring.lines().map(|line| (line.start, line.end))
}

/// Exterior and hole rings
fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

fn polygon_edges(polygon: &Polygon<f64>) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
    rings(polygon).flat_map(ring_edges)
}

/// Ring vertices without the closing duplicate
fn ring_vertices(ring: &LineString<f64>) -> &[Coord<f64>] {
    &ring.0[..ring.0.len().saturating_sub(1)]
}

fn polygon_vertices(polygon: &Polygon<f64>) -> impl Iterator<Item = Coord<f64>> + '_ {
    rings(polygon).flat_map(|ring| ring_vertices(ring).iter().copied())
}

/// Even-odd ray cast over every ring, so holes count as outside
fn point_in_polygon_raw(p: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    let mut inside = false;
    for (a, b) in polygon_edges(polygon) {
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Distance from a point to the nearest ring of a polygon
pub fn boundary_distance(p: Coord<f64>, polygon: &Polygon<f64>) -> f64 {
    polygon_edges(polygon)
        .map(|(a, b)| point_segment_distance(p, a, b))
        .fold(f64::INFINITY, f64::min)
}

/// Boundary-inclusive point-in-polygon
pub fn point_in_polygon(p: Coord<f64>, polygon: &Polygon<f64>, tol: &Tolerance) -> bool {
    point_in_polygon_raw(p, polygon) || boundary_distance(p, polygon) <= tol.eps()
}

/// Inside and farther than `eps` from every ring
pub fn point_strictly_inside(p: Coord<f64>, polygon: &Polygon<f64>, tol: &Tolerance) -> bool {
    point_in_polygon_raw(p, polygon) && boundary_distance(p, polygon) > tol.eps()
}

/// Boundary-inclusive point-in-region
pub fn point_in_region(p: Coord<f64>, region: &MultiPolygon<f64>, tol: &Tolerance) -> bool {
    region.0.iter().any(|polygon| point_in_polygon(p, polygon, tol))
}

/// Is `inner` entirely inside `region` (boundary contact allowed)?
///
/// Holds when every vertex and edge midpoint of `inner` is inside the region,
/// no edge of `inner` crosses a region ring, and no region vertex (including
/// hole vertices) sits strictly inside `inner`.
pub fn polygon_within(inner: &Polygon<f64>, region: &MultiPolygon<f64>, tol: &Tolerance) -> bool {
    let inner_edges: Vec<_> = polygon_edges(inner).collect();

    for &(a, b) in &inner_edges {
        if !point_in_region(a, region, tol) {
            return false;
        }
        let mid = Coord {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        };
        if !point_in_region(mid, region, tol) {
            return false;
        }
    }

    for polygon in &region.0 {
        for (r1, r2) in polygon_edges(polygon) {
            if inner_edges
                .iter()
                .any(|&(a, b)| segments_cross(a, b, r1, r2, tol))
            {
                return false;
            }
        }
        if polygon_vertices(polygon).any(|v| point_strictly_inside(v, inner, tol)) {
            return false;
        }
    }

    true
}

/// Area shared by two polygons
pub fn overlap_area(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    let a = MultiPolygon::new(vec![a.clone()]);
    let b = MultiPolygon::new(vec![b.clone()]);
    a.intersection(&b).unsigned_area()
}

/// Do the interiors of two polygons overlap? Shared edges alone do not count.
///
/// Cheap exits first (bounding boxes, crossings, vertices inside); the
/// boolean intersection only runs for the remaining ambiguous contacts.
pub fn interiors_overlap(a: &Polygon<f64>, b: &Polygon<f64>, tol: &Tolerance) -> bool {
    match (aabb(a), aabb(b)) {
        (Some(ra), Some(rb)) if rects_overlap(&ra, &rb, -tol.eps()) => {}
        _ => return false,
    }

    for (a1, a2) in polygon_edges(a) {
        if polygon_edges(b).any(|(b1, b2)| segments_cross(a1, a2, b1, b2, tol)) {
            return true;
        }
    }

    if polygon_vertices(a).any(|v| point_strictly_inside(v, b, tol))
        || polygon_vertices(b).any(|v| point_strictly_inside(v, a, tol))
    {
        return true;
    }

    overlap_area(a, b) > tol.area_eps()
}

/// Minimum distance between two polygons; zero when they touch or overlap
pub fn polygon_distance(a: &Polygon<f64>, b: &Polygon<f64>, tol: &Tolerance) -> f64 {
    if polygon_vertices(a).any(|v| point_in_polygon(v, b, tol))
        || polygon_vertices(b).any(|v| point_in_polygon(v, a, tol))
    {
        return 0.0;
    }

    let mut best = f64::INFINITY;
    for (a1, a2) in polygon_edges(a) {
        for (b1, b2) in polygon_edges(b) {
            best = best.min(segment_distance(a1, a2, b1, b2));
            if best == 0.0 {
                return 0.0;
            }
        }
    }
    best
}

/// Minimum distance from a polygon's rings to a line string, ignoring
/// containment
pub fn polygon_line_distance(polygon: &Polygon<f64>, line: &LineString<f64>) -> f64 {
    let mut best = f64::INFINITY;
    for (a1, a2) in polygon_edges(polygon) {
        for (b1, b2) in ring_edges(line) {
            best = best.min(segment_distance(a1, a2, b1, b2));
        }
    }
    best
}

/// Minimum distance from a point to a polygon; zero inside
pub fn point_polygon_distance(p: Coord<f64>, polygon: &Polygon<f64>, tol: &Tolerance) -> f64 {
    if point_in_polygon(p, polygon, tol) {
        0.0
    } else {
        boundary_distance(p, polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size)
        ]
    }

    #[test]
    fn test_boundary_point_is_inside() {
        let tol = Tolerance::default();
        let sq = square(0.0, 0.0, 2.0);
        assert!(point_in_polygon(Coord { x: 2.0, y: 1.0 }, &sq, &tol));
        assert!(!point_strictly_inside(Coord { x: 2.0, y: 1.0 }, &sq, &tol));
        assert!(!point_in_polygon(Coord { x: 2.1, y: 1.0 }, &sq, &tol));
    }

    #[test]
    fn test_hole_is_outside() {
        let tol = Tolerance::default();
        let holed = Polygon::new(
            square(0.0, 0.0, 10.0).exterior().clone(),
            vec![square(4.0, 4.0, 2.0).exterior().clone()],
        );
        assert!(!point_in_polygon(Coord { x: 5.0, y: 5.0 }, &holed, &tol));
        assert!(point_in_polygon(Coord { x: 1.0, y: 1.0 }, &holed, &tol));
    }

    #[test]
    fn test_touching_squares_do_not_overlap() {
        let tol = Tolerance::default();
        assert!(!interiors_overlap(
            &square(0.0, 0.0, 2.0),
            &square(2.0, 0.0, 2.0),
            &tol
        ));
        assert!(interiors_overlap(
            &square(0.0, 0.0, 2.0),
            &square(1.0, 1.0, 2.0),
            &tol
        ));
    }

    #[test]
    fn test_identical_squares_overlap() {
        let tol = Tolerance::default();
        let sq = square(0.0, 0.0, 2.0);
        assert!(interiors_overlap(&sq, &sq, &tol));
    }

    #[test]
    fn test_within_rejects_region_with_hole_under_polygon() {
        let tol = Tolerance::default();
        let holed = Polygon::new(
            square(0.0, 0.0, 10.0).exterior().clone(),
            vec![square(4.0, 4.0, 1.0).exterior().clone()],
        );
        let region = MultiPolygon::new(vec![holed]);
        assert!(!polygon_within(&square(3.0, 3.0, 3.0), &region, &tol));
        assert!(polygon_within(&square(0.0, 0.0, 3.0), &region, &tol));
    }

    #[test]
    fn test_polygon_distance() {
        let tol = Tolerance::default();
        let d = polygon_distance(&square(0.0, 0.0, 1.0), &square(4.0, 0.0, 1.0), &tol);
        assert!((d - 3.0).abs() < 1e-12);
        assert_eq!(
            polygon_distance(&square(0.0, 0.0, 4.0), &square(1.0, 1.0, 1.0), &tol),
            0.0
        );
    }
}
