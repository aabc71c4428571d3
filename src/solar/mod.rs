//! Solar orientation scoring
//!
//! A placement's score is how squarely its dominant facade faces the
//! equator, scaled by how much of the year's sunlight actually arrives from
//! that side at this latitude. Closed-form and deterministic; overshadowing
//! between structures is handled by the layout scorer, not here.

pub mod sun_path;

pub use sun_path::{SunPath, SunSample, AXIAL_TILT_DEG};

use crate::geometry::angle::{angular_distance_deg, normalize_deg};
use crate::parcel::Parcel;
use serde::{Deserialize, Serialize};

/// Floor for the seasonal factor so that near-equatorial sites still rank
/// orientations instead of scoring everything zero
pub const MIN_SEASONAL_FACTOR: f64 = 0.05;

/// Lowest sun altitude used for shadow lengths (degrees)
pub const MIN_NOON_ALTITUDE_DEG: f64 = 1.0;

/// Relative difference below which width and depth count as equal
const SQUARE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarScore {
    /// Overall exposure in [0, 1]
    pub score: f64,
    /// Compass bearing of the dominant facade's outward normal
    pub facade_azimuth_deg: f64,
    /// How squarely that facade faces the equator, in [0, 1]
    pub alignment: f64,
}

/// Scores footprint orientations for one site
#[derive(Debug, Clone)]
pub struct SolarEvaluator {
    latitude_deg: f64,
    north_offset_deg: f64,
    equator_azimuth_deg: f64,
    seasonal_factor: f64,
    winter_noon_altitude_deg: f64,
}

impl SolarEvaluator {
    /// Precompute the seasonal sun path for a site
    ///
    /// `north_offset_deg` is the compass bearing of the local +y axis.
    pub fn new(latitude_deg: f64, north_offset_deg: f64) -> Self {
        let path = SunPath::new(latitude_deg);
        let latitude_deg = path.latitude_deg();
        let equator_azimuth_deg = if latitude_deg >= 0.0 { 180.0 } else { 0.0 };

        let seasonal_factor = path
            .weighted_projection(equator_azimuth_deg)
            .unwrap_or(0.0)
            .clamp(MIN_SEASONAL_FACTOR, 1.0);

        let winter_noon_altitude_deg =
            (90.0 - latitude_deg.abs() - AXIAL_TILT_DEG).max(MIN_NOON_ALTITUDE_DEG);

        Self {
            latitude_deg,
            north_offset_deg,
            equator_azimuth_deg,
            seasonal_factor,
            winter_noon_altitude_deg,
        }
    }

    pub fn for_parcel(parcel: &Parcel) -> Self {
        Self::new(parcel.latitude(), parcel.north_offset_deg())
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    /// South in the northern hemisphere, north in the southern
    pub fn equator_azimuth_deg(&self) -> f64 {
        self.equator_azimuth_deg
    }

    pub fn seasonal_factor(&self) -> f64 {
        self.seasonal_factor
    }

    /// Solar altitude at noon on the winter solstice
    pub fn winter_noon_altitude_deg(&self) -> f64 {
        self.winter_noon_altitude_deg
    }

    /// Compass bearing of a local-frame direction (0° = +x, counter-clockwise)
    pub fn local_to_azimuth(&self, local_deg: f64) -> f64 {
        normalize_deg(self.north_offset_deg + 90.0 - local_deg)
    }

    /// Score a `width` × `depth` footprint rotated by `rotation_deg`
    ///
    /// Only the largest facades compete (both long sides; all four for a
    /// square). The one facing closest to the equator is dominant; the
    /// first listed wins ties.
    pub fn evaluate(&self, rotation_deg: f64, width: f64, depth: f64) -> SolarScore {
        // Outward normals of the rectangle's sides, local frame. Edge 0 runs
        // along the width axis, so the width sides face rotation ± 90.
        let width_sides = [rotation_deg - 90.0, rotation_deg + 90.0];
        let depth_sides = [rotation_deg, rotation_deg + 180.0];

        let square = (width - depth).abs() <= SQUARE_TOLERANCE * width.max(depth);
        let facades: Vec<f64> = if square {
            vec![width_sides[0], depth_sides[0], width_sides[1], depth_sides[1]]
        } else if width > depth {
            width_sides.to_vec()
        } else {
            depth_sides.to_vec()
        };

        let mut best: Option<(f64, f64)> = None;
        for local in facades {
            let azimuth = self.local_to_azimuth(local);
            let deviation = angular_distance_deg(azimuth, self.equator_azimuth_deg);
            if best.map_or(true, |(_, d)| deviation < d) {
                best = Some((azimuth, deviation));
            }
        }
        let (facade_azimuth_deg, deviation) = best.unwrap_or((self.equator_azimuth_deg, 0.0));

        let alignment = (1.0 + deviation.to_radians().cos()) / 2.0;
        SolarScore {
            score: (alignment * self.seasonal_factor).clamp(0.0, 1.0),
            facade_azimuth_deg,
            alignment,
        }
    }

    /// Length of the winter-noon shadow cast by a structure of `height`
    pub fn winter_shadow_length(&self, height: f64) -> f64 {
        height / self.winter_noon_altitude_deg.to_radians().tan()
    }
}
