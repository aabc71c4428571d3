//! Greedy placement search
//!
//! Structures are placed one at a time in an injectable order. For each,
//! every candidate (anchor × rotation × size tier) is validated against the
//! parcel and the placements already committed, scored, and the best one is
//! committed before the next structure is explored.

pub mod budget;
pub mod candidates;
pub mod optimizer;
pub mod ordering;

pub use budget::{BudgetTracker, SearchBudget};
pub use candidates::{AnchorGrid, Candidate};
pub use optimizer::PlacementSearch;
pub use ordering::{
    InputOrder, LargestFirst, OrderingKind, OrderingStrategy, PriorityOrdering, SmallestFirst,
};

use serde::{Deserialize, Serialize};

/// Default weight of solar exposure in the candidate objective
pub const DEFAULT_CANDIDATE_SOLAR_WEIGHT: f64 = 0.5;

/// Default weight of adjacency satisfaction in the candidate objective
pub const DEFAULT_CANDIDATE_ADJACENCY_WEIGHT: f64 = 0.3;

/// Default weight of remaining free area in the candidate objective
pub const DEFAULT_CANDIDATE_EFFICIENCY_WEIGHT: f64 = 0.2;

/// Weights of the per-candidate objective
///
/// The objective is the weighted mean of three terms in [0, 1], so it is
/// itself in [0, 1] whatever the weights' scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateWeights {
    pub solar: f64,
    pub adjacency: f64,
    pub efficiency: f64,
}

impl Default for CandidateWeights {
    fn default() -> Self {
        Self {
            solar: DEFAULT_CANDIDATE_SOLAR_WEIGHT,
            adjacency: DEFAULT_CANDIDATE_ADJACENCY_WEIGHT,
            efficiency: DEFAULT_CANDIDATE_EFFICIENCY_WEIGHT,
        }
    }
}

impl CandidateWeights {
    pub fn validate(&self) -> Result<(), String> {
        for (name, w) in [
            ("solar", self.solar),
            ("adjacency", self.adjacency),
            ("efficiency", self.efficiency),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(format!("candidate weight {} ({}) must be non-negative", name, w));
            }
        }
        if self.solar + self.adjacency + self.efficiency <= 0.0 {
            return Err("candidate weights must not all be zero".into());
        }
        Ok(())
    }

    /// Weighted mean of the three objective terms
    pub fn combine(&self, solar: f64, adjacency: f64, efficiency: f64) -> f64 {
        let total = self.solar + self.adjacency + self.efficiency;
        (self.solar * solar + self.adjacency * adjacency + self.efficiency * efficiency) / total
    }
}
