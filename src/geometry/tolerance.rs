//! Shared epsilon policy for all geometric comparisons

/// Absolute tolerance derived from a relative epsilon and the working extent
///
/// Lengths within `eps` of each other are equal; areas within `area_eps` of
/// zero are empty. Consumers never compare floats against literals directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    eps: f64,
    extent: f64,
}

impl Tolerance {
    /// Default relative epsilon (1e-6 of the parcel extent)
    pub const DEFAULT_RELATIVE: f64 = 1e-6;

    /// Absolute slack for angles (degrees) that round-trip through trig
    pub const ANGLE_EPS_DEG: f64 = 1e-6;

    /// Tolerance scaled to a working extent in meters
    ///
    /// Extents below one meter are treated as one meter so tiny inputs still
    /// get a usable epsilon.
    pub fn for_extent(relative: f64, extent: f64) -> Self {
        let extent = if extent.is_finite() { extent.max(1.0) } else { 1.0 };
        Self {
            eps: relative * extent,
            extent,
        }
    }

    /// Length tolerance
    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Area tolerance: a sliver `eps` wide spanning the whole extent
    #[inline]
    pub fn area_eps(&self) -> f64 {
        self.eps * self.extent
    }

    #[inline]
    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.eps
    }

    #[inline]
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    /// `a <= b + slack` for angles in degrees
    #[inline]
    pub fn angle_le(a: f64, b: f64) -> bool {
        a <= b + Self::ANGLE_EPS_DEG
    }

    /// Whole `step`s that fit in `span`, counting a span within `eps` of a
    /// multiple as reaching it
    #[inline]
    pub fn lattice_steps(&self, span: f64, step: f64) -> usize {
        ((span + self.eps) / step).floor().max(0.0) as usize
    }

    /// `a <= b` allowing `a` to exceed `b` by up to `eps`
    #[inline]
    pub fn le(&self, a: f64, b: f64) -> bool {
        a <= b + self.eps
    }

    /// `a >= b` allowing `a` to fall short of `b` by up to `eps`
    #[inline]
    pub fn ge(&self, a: f64, b: f64) -> bool {
        a + self.eps >= b
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::for_extent(Self::DEFAULT_RELATIVE, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_with_extent() {
        let tol = Tolerance::for_extent(1e-6, 40.0);
        assert!((tol.eps() - 4e-5).abs() < 1e-12);
        assert!(tol.approx_eq(10.0, 10.00003));
        assert!(!tol.approx_eq(10.0, 10.0001));
    }

    #[test]
    fn test_lattice_steps_absorb_rounding() {
        let tol = Tolerance::for_extent(1e-6, 40.0);
        assert_eq!(tol.lattice_steps(34.0 - 1e-12, 1.0), 34);
        assert_eq!(tol.lattice_steps(2.5, 1.0), 2);
        assert_eq!(tol.lattice_steps(-1e-6, 1.0), 0);
        assert!(Tolerance::angle_le(1.0 + 1e-9, 1.0));
        assert!(!Tolerance::angle_le(1.001, 1.0));
    }

    #[test]
    fn test_small_extent_clamped() {
        let tol = Tolerance::for_extent(1e-6, 0.01);
        assert_eq!(tol.eps(), 1e-6);
    }
}
