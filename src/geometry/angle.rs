//! Angle helpers (degrees, local frame: 0° = +x, counter-clockwise positive)

use geo::Coord;

/// Wrap into [0, 360)
pub fn normalize_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap into [0, 180), treating a direction and its reverse as the same line
pub fn normalize_line_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(180.0);
    if wrapped >= 180.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest rotation between two directions, in [0, 180]
pub fn angular_distance_deg(a: f64, b: f64) -> f64 {
    let d = normalize_deg(a - b);
    d.min(360.0 - d)
}

/// Smallest rotation between two undirected lines, in [0, 90]
pub fn line_angle_diff_deg(a: f64, b: f64) -> f64 {
    let d = normalize_line_deg(a - b);
    d.min(180.0 - d)
}

/// Direction of travel from `from` to `to`
pub fn direction_deg(from: Coord<f64>, to: Coord<f64>) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Undirected angle of the line through two points, in [0, 180)
pub fn line_angle_deg(from: Coord<f64>, to: Coord<f64>) -> f64 {
    normalize_line_deg(direction_deg(from, to))
}
