//! Seasonal sun path sampling
//!
//! Positions come from the standard spherical-astronomy relations for a
//! given latitude, declination and hour angle. No ephemeris, no refraction.

use crate::geometry::angle::normalize_deg;

/// Earth's axial tilt: the solstice declination (degrees)
pub const AXIAL_TILT_DEG: f64 = 23.44;

/// Declinations sampled: winter solstice, equinox, summer solstice
/// (northern-hemisphere naming)
pub const SAMPLE_DECLINATIONS_DEG: [f64; 3] = [-AXIAL_TILT_DEG, 0.0, AXIAL_TILT_DEG];

/// Hour angles span six hours either side of solar noon
pub const HOUR_ANGLE_LIMIT_DEG: f64 = 90.0;

/// One hour of earth rotation
pub const HOUR_ANGLE_STEP_DEG: f64 = 15.0;

/// Latitudes are clamped just short of the poles, where azimuth is undefined
pub const MAX_LATITUDE_DEG: f64 = 89.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunSample {
    pub declination_deg: f64,
    pub hour_angle_deg: f64,
    pub altitude_deg: f64,
    /// Compass bearing, clockwise from north
    pub azimuth_deg: f64,
}

/// Daytime sun positions over a year for one latitude
#[derive(Debug, Clone)]
pub struct SunPath {
    latitude_deg: f64,
    samples: Vec<SunSample>,
}

impl SunPath {
    /// Sample every declination and hour angle; samples below the horizon
    /// are dropped
    pub fn new(latitude_deg: f64) -> Self {
        let latitude_deg = latitude_deg.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG);
        let steps = (2.0 * HOUR_ANGLE_LIMIT_DEG / HOUR_ANGLE_STEP_DEG).round() as i32;

        let mut samples = Vec::with_capacity(SAMPLE_DECLINATIONS_DEG.len() * (steps as usize + 1));
        for &declination_deg in &SAMPLE_DECLINATIONS_DEG {
            for k in 0..=steps {
                let hour_angle_deg = -HOUR_ANGLE_LIMIT_DEG + k as f64 * HOUR_ANGLE_STEP_DEG;
                let (altitude_deg, azimuth_deg) =
                    sun_position(latitude_deg, declination_deg, hour_angle_deg);
                if altitude_deg > 0.0 {
                    samples.push(SunSample {
                        declination_deg,
                        hour_angle_deg,
                        altitude_deg,
                        azimuth_deg,
                    });
                }
            }
        }

        Self {
            latitude_deg,
            samples,
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn samples(&self) -> &[SunSample] {
        &self.samples
    }

    /// Mean of `cos(azimuth - target)` weighted by `sin(altitude)`
    ///
    /// 1.0 when all sunlight arrives from `target`, 0.0 when it is balanced
    /// around it, negative when it mostly comes from behind. `None` when
    /// the sun never rises in the sampled days.
    pub fn weighted_projection(&self, target_azimuth_deg: f64) -> Option<f64> {
        let (sum, weight) = self.samples.iter().fold((0.0, 0.0), |(sum, weight), s| {
            let w = s.altitude_deg.to_radians().sin();
            let c = (s.azimuth_deg - target_azimuth_deg).to_radians().cos();
            (sum + w * c, weight + w)
        });
        if weight > 0.0 {
            Some(sum / weight)
        } else {
            None
        }
    }
}

/// Altitude and compass azimuth (degrees) of the sun
pub fn sun_position(latitude_deg: f64, declination_deg: f64, hour_angle_deg: f64) -> (f64, f64) {
    let phi = latitude_deg.to_radians();
    let delta = declination_deg.to_radians();
    let h = hour_angle_deg.to_radians();

    let sin_alt = phi.sin() * delta.sin() + phi.cos() * delta.cos() * h.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    // East and north components of the sun direction
    let east = -delta.cos() * h.sin();
    let north = delta.sin() * phi.cos() - delta.cos() * h.cos() * phi.sin();
    let azimuth = normalize_deg(east.atan2(north).to_degrees());

    (altitude.to_degrees(), azimuth)
}
