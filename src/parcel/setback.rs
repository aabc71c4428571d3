//! Jurisdiction setback rules
//!
//! Rules arrive either as one distance for every edge, an explicit list per
//! edge, or a front/side/rear rule set keyed to the parcel's frontage edge.
//! All forms resolve to one distance per boundary edge.

use crate::core::error::{PlannerError, Result};
use crate::geometry::SitePolygon;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Feet to meters, for rule sets transcribed from US zoning codes
pub const FEET_TO_METERS: f64 = 0.3048;

/// Front/side/rear setbacks for one jurisdiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetbackRules {
    /// Human-readable jurisdiction or zoning district name
    #[serde(default)]
    pub jurisdiction: String,
    /// Distance from the frontage (street) edge
    pub front: f64,
    /// Distance from every edge that is neither front nor rear
    pub side: f64,
    /// Distance from the edge opposite the frontage
    pub rear: f64,
    /// Index of the boundary edge facing the street
    #[serde(default)]
    pub frontage_edge: usize,
    /// Maximum fraction of the parcel area covered by structures
    #[serde(default)]
    pub max_lot_coverage: Option<f64>,
}

impl SetbackRules {
    /// Typical suburban residential district: 25 ft front, 10 ft side,
    /// 20 ft rear
    pub fn residential_default() -> Self {
        Self {
            jurisdiction: "residential".into(),
            front: 25.0 * FEET_TO_METERS,
            side: 10.0 * FEET_TO_METERS,
            rear: 20.0 * FEET_TO_METERS,
            frontage_edge: 0,
            max_lot_coverage: Some(0.4),
        }
    }

    /// Parse a rule set from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a rule set from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Per-edge distances for a boundary, given the frontage edge's index in
    /// the boundary's stored (counter-clockwise) order
    ///
    /// The rear edge is the one whose direction is most nearly opposite the
    /// frontage edge's; earlier edges win ties.
    fn resolve(&self, boundary: &SitePolygon, frontage: usize) -> Vec<f64> {
        let n = boundary.vertex_count();
        let direction = |i: usize| {
            let (a, b) = boundary.edge(i);
            let len = (b.x - a.x).hypot(b.y - a.y);
            ((b.x - a.x) / len, (b.y - a.y) / len)
        };
        let front_dir = direction(frontage);

        let rear_edge = (0..n)
            .filter(|&i| i != frontage)
            .min_by(|&i, &j| {
                let (di, dj) = (direction(i), direction(j));
                let dot_i = di.0 * front_dir.0 + di.1 * front_dir.1;
                let dot_j = dj.0 * front_dir.0 + dj.1 * front_dir.1;
                dot_i.total_cmp(&dot_j).then(i.cmp(&j))
            });

        (0..n)
            .map(|i| {
                if i == frontage {
                    self.front
                } else if Some(i) == rear_edge {
                    self.rear
                } else {
                    self.side
                }
            })
            .collect()
    }
}

/// Setback input for a planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Setbacks {
    /// Same distance from every boundary edge
    Uniform { distance: f64 },
    /// One distance per boundary edge, in boundary order
    PerEdge { distances: Vec<f64> },
    /// Front/side/rear rule set
    Jurisdiction(SetbackRules),
}

impl Setbacks {
    pub fn uniform(distance: f64) -> Self {
        Setbacks::Uniform { distance }
    }

    /// Resolve to one non-negative distance per boundary edge
    ///
    /// Edge indices in the input (per-edge lists, frontage edge) follow the
    /// caller's vertex order. A boundary supplied clockwise is stored
    /// reversed, so indices are remapped to match.
    pub fn resolve(&self, boundary: &SitePolygon, input_was_clockwise: bool) -> Result<Vec<f64>> {
        let n = boundary.vertex_count();
        // Reversing the vertices maps input edge i onto stored edge n-2-i
        let to_stored = |i: usize| {
            if input_was_clockwise {
                (2 * n - 2 - i) % n
            } else {
                i
            }
        };
        let distances = match self {
            Setbacks::Uniform { distance } => vec![*distance; n],
            Setbacks::PerEdge { distances } => {
                if distances.len() != n {
                    return Err(PlannerError::InvalidSetback(format!(
                        "expected {} per-edge distances, got {}",
                        n,
                        distances.len()
                    )));
                }
                // The mapping is its own inverse
                (0..n).map(|i| distances[to_stored(i)]).collect()
            }
            Setbacks::Jurisdiction(rules) => {
                if rules.frontage_edge >= n {
                    return Err(PlannerError::InvalidSetback(format!(
                        "frontage_edge {} out of range for a {}-edge boundary",
                        rules.frontage_edge, n
                    )));
                }
                rules.resolve(boundary, to_stored(rules.frontage_edge))
            }
        };

        if let Some(bad) = distances.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(PlannerError::InvalidSetback(format!(
                "setback distance {} must be finite and non-negative",
                bad
            )));
        }
        Ok(distances)
    }

    /// Lot coverage cap, when the rule set declares one
    pub fn max_lot_coverage(&self) -> Option<f64> {
        match self {
            Setbacks::Jurisdiction(rules) => rules.max_lot_coverage,
            _ => None,
        }
    }
}
