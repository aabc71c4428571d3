//! Engine configuration with documented constants
//!
//! Every tunable of a planning run lives here. Values are per-run: a config is
//! passed by reference into the planner and never stored globally, so
//! concurrent runs with different settings do not interfere.

use crate::core::error::{PlannerError, Result};
use crate::layout::scorer::ScoringWeights;
use crate::search::budget::SearchBudget;
use crate::search::ordering::OrderingKind;
use crate::search::CandidateWeights;
use serde::{Deserialize, Serialize};

/// Finest anchor grid spacing accepted (m)
pub const MIN_GRID_RESOLUTION: f64 = 0.01;

/// Configuration for one planning run
///
/// Loadable from the `[config]` table of a plan request. Missing keys fall
/// back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === GEOMETRY ===
    /// Relative epsilon for all boundary and equality comparisons
    ///
    /// Scaled by the parcel's largest extent, so a 40m parcel compares
    /// coordinates to within 40µm. Every geometric predicate in the crate
    /// shares this one tolerance.
    pub tolerance: f64,

    /// Smallest parcel area (m²) accepted as a real parcel
    ///
    /// Boundaries below this are rejected as degenerate.
    pub min_parcel_area: f64,

    // === SEARCH ===
    /// Spacing (m) of the anchor grid laid over the buildable region
    ///
    /// Halving it roughly quadruples candidate count and search time.
    /// Must be at least [`MIN_GRID_RESOLUTION`].
    pub grid_resolution: f64,

    /// Largest anchor lattice a run may lay over the buildable region
    ///
    /// Checked against the lattice size before any point is generated.
    pub max_anchor_points: usize,

    /// Angular step (degrees) for structures with free rotation
    ///
    /// Rotations sweep [0, 180); rectangles are symmetric under a half turn.
    pub rotation_step_deg: f64,

    /// Maximum deviation (degrees) between an edge-fixed structure's primary
    /// edge and the nearest parcel boundary edge
    pub edge_alignment_tolerance_deg: f64,

    /// Weights for the per-candidate objective
    pub candidate_weights: CandidateWeights,

    /// Orderings to try; each produces one layout
    pub orderings: Vec<OrderingKind>,

    /// Candidate/time budget for each ordering
    pub budget: SearchBudget,

    // === SCORING ===
    /// Weights for the aggregate layout score
    pub scoring: ScoringWeights,

    /// Multiplier applied to a placement's solar score when a taller
    /// neighbour on its equator side casts a winter shadow over it
    ///
    /// 1.0 disables shading entirely.
    pub shading_penalty: f64,

    /// Number of layouts returned after ranking
    pub top_n: usize,

    // === PARALLELIZATION ===
    /// Minimum candidate count in a chunk before scoring runs on the rayon
    /// pool
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,

    /// Candidates scored between budget checks
    pub chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: crate::geometry::Tolerance::DEFAULT_RELATIVE,
            min_parcel_area: 1.0,

            grid_resolution: 1.0,
            max_anchor_points: 250_000,
            rotation_step_deg: 15.0,
            edge_alignment_tolerance_deg: 1.0,
            candidate_weights: CandidateWeights::default(),
            orderings: vec![OrderingKind::Priority, OrderingKind::SmallestFirst],
            budget: SearchBudget::default(),

            scoring: ScoringWeights::default(),
            shading_penalty: 0.5,
            top_n: 3,

            parallel_threshold: 256,
            chunk_size: 2048,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PlannerError::InvalidConfig(msg));

        if !(self.tolerance > 0.0 && self.tolerance < 1e-2) {
            return invalid(format!("tolerance ({}) must be in (0, 0.01)", self.tolerance));
        }
        if !(self.min_parcel_area > 0.0) {
            return invalid(format!(
                "min_parcel_area ({}) must be positive",
                self.min_parcel_area
            ));
        }
        if !(self.grid_resolution >= MIN_GRID_RESOLUTION) || !self.grid_resolution.is_finite() {
            return invalid(format!(
                "grid_resolution ({}) must be at least {}",
                self.grid_resolution, MIN_GRID_RESOLUTION
            ));
        }
        if self.max_anchor_points == 0 {
            return invalid("max_anchor_points must be at least 1".into());
        }
        if !(self.rotation_step_deg > 0.0 && self.rotation_step_deg <= 180.0) {
            return invalid(format!(
                "rotation_step_deg ({}) must be in (0, 180]",
                self.rotation_step_deg
            ));
        }
        if !(self.edge_alignment_tolerance_deg >= 0.0 && self.edge_alignment_tolerance_deg < 90.0)
        {
            return invalid(format!(
                "edge_alignment_tolerance_deg ({}) must be in [0, 90)",
                self.edge_alignment_tolerance_deg
            ));
        }
        if !(0.0..=1.0).contains(&self.shading_penalty) {
            return invalid(format!(
                "shading_penalty ({}) must be in [0, 1]",
                self.shading_penalty
            ));
        }
        if self.orderings.is_empty() {
            return invalid("at least one ordering is required".into());
        }
        if self.top_n == 0 {
            return invalid("top_n must be at least 1".into());
        }
        if self.chunk_size == 0 {
            return invalid("chunk_size must be at least 1".into());
        }

        self.candidate_weights
            .validate()
            .map_err(PlannerError::InvalidConfig)?;
        self.scoring.validate().map_err(PlannerError::InvalidConfig)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_grid_resolution() {
        let config = EngineConfig {
            grid_resolution: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlannerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_grid_finer_than_minimum() {
        let config = EngineConfig {
            grid_resolution: 1e-6,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlannerError::InvalidConfig(_))
        ));
        let finest = EngineConfig {
            grid_resolution: MIN_GRID_RESOLUTION,
            ..EngineConfig::default()
        };
        assert!(finest.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_orderings() {
        let config = EngineConfig {
            orderings: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            grid_resolution = 0.5
            orderings = ["largest_first"]
            "#,
        )
        .unwrap();
        assert_eq!(config.grid_resolution, 0.5);
        assert_eq!(config.orderings, vec![OrderingKind::LargestFirst]);
        assert_eq!(config.rotation_step_deg, 15.0);
    }
}
