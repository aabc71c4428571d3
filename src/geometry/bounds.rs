//! Bounding boxes and rectangle construction

use super::angle::line_angle_deg;
use geo::{BoundingRect, MinimumRotatedRect};
use geo_types::{Coord, LineString, MultiPolygon, Polygon, Rect};

/// Axis-aligned bounding box of a polygon
pub fn aabb(polygon: &Polygon<f64>) -> Option<Rect<f64>> {
    polygon.bounding_rect()
}

/// Axis-aligned bounding box of a region
pub fn region_aabb(region: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    region.bounding_rect()
}

/// Do two boxes overlap once each is grown by `margin`? A negative margin
/// requires overlap deeper than `-margin`.
pub fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>, margin: f64) -> bool {
    a.min().x <= b.max().x + margin
        && b.min().x <= a.max().x + margin
        && a.min().y <= b.max().y + margin
        && b.min().y <= a.max().y + margin
}

/// Larger side of a box
pub fn extent(rect: &Rect<f64>) -> f64 {
    rect.width().max(rect.height())
}

/// Minimum-area rotated bounding box
pub fn rotated_bbox(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    polygon.minimum_rotated_rect()
}

/// Angle in [0, 180) of the long side of the minimum rotated bounding box
pub fn principal_axis_deg(polygon: &Polygon<f64>) -> Option<f64> {
    let rect = rotated_bbox(polygon)?;
    let ring = &rect.exterior().0;
    if ring.len() < 3 {
        return None;
    }
    let (a, b, c) = (ring[0], ring[1], ring[2]);
    let first = (b.x - a.x).hypot(b.y - a.y);
    let second = (c.x - b.x).hypot(c.y - b.y);
    Some(if first >= second {
        line_angle_deg(a, b)
    } else {
        line_angle_deg(b, c)
    })
}

/// Rectangle of `width` × `depth` centred on `center`, rotated
/// counter-clockwise by `rotation_deg`
///
/// Vertex order is counter-clockwise starting at the local (-w/2, -d/2)
/// corner, so edge 0 runs along the width axis at `rotation_deg`.
pub fn rectangle(center: Coord<f64>, width: f64, depth: f64, rotation_deg: f64) -> Polygon<f64> {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let (hw, hd) = (width / 2.0, depth / 2.0);
    let corners: Vec<Coord<f64>> = [(-hw, -hd), (hw, -hd), (hw, hd), (-hw, hd)]
        .iter()
        .map(|&(lx, ly)| Coord {
            x: center.x + lx * cos - ly * sin,
            y: center.y + lx * sin + ly * cos,
        })
        .collect();
    Polygon::new(LineString::from(corners), vec![])
}
