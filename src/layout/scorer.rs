//! Layout scoring and selection
//!
//! A layout's score is a weighted mean of three terms in [0, 1]:
//!
//! - mean solar exposure over its placements, after winter shading
//! - fraction of requested structures placed
//! - mean adjacency satisfaction over placements that asked for one
//!
//! Selection ranks by score, then fraction placed, then mean solar, then
//! generation, and drops layouts that repeat an earlier arrangement.

use super::Layout;
use crate::core::config::EngineConfig;
use crate::geometry::angle::{angular_distance_deg, direction_deg};
use crate::geometry::ops::polygon_distance;
use crate::geometry::Tolerance;
use crate::solar::SolarEvaluator;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Weight of mean solar exposure
pub const DEFAULT_SOLAR_WEIGHT: f64 = 0.35;

/// Weight of the fraction of structures placed
pub const DEFAULT_PLACED_WEIGHT: f64 = 0.45;

/// Weight of mean adjacency satisfaction
pub const DEFAULT_ADJACENCY_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub solar: f64,
    pub placed: f64,
    pub adjacency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            solar: DEFAULT_SOLAR_WEIGHT,
            placed: DEFAULT_PLACED_WEIGHT,
            adjacency: DEFAULT_ADJACENCY_WEIGHT,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), String> {
        for (name, w) in [
            ("solar", self.solar),
            ("placed", self.placed),
            ("adjacency", self.adjacency),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(format!("scoring weight {} ({}) must be non-negative", name, w));
            }
        }
        if self.solar + self.placed + self.adjacency <= 0.0 {
            return Err("scoring weights must not all be zero".into());
        }
        Ok(())
    }
}

/// Score breakdown for one layout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutScore {
    pub total: f64,
    pub mean_solar: f64,
    pub fraction_placed: f64,
    pub mean_adjacency: f64,
    /// Placements whose solar score was reduced by a neighbour's shadow
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shaded: Vec<String>,
}

pub struct LayoutScorer<'a> {
    weights: ScoringWeights,
    shading_penalty: f64,
    solar: &'a SolarEvaluator,
    tolerance: Tolerance,
}

impl<'a> LayoutScorer<'a> {
    pub fn new(config: &EngineConfig, solar: &'a SolarEvaluator, tolerance: Tolerance) -> Self {
        Self {
            weights: config.scoring,
            shading_penalty: config.shading_penalty,
            solar,
            tolerance,
        }
    }

    pub fn score(&self, layout: &Layout) -> LayoutScore {
        let shaded = self.shaded_placements(layout);

        let mean_solar = if layout.placements.is_empty() {
            0.0
        } else {
            layout
                .placements
                .iter()
                .zip(&shaded)
                .map(|(p, &is_shaded)| {
                    if is_shaded {
                        p.solar.score * self.shading_penalty
                    } else {
                        p.solar.score
                    }
                })
                .sum::<f64>()
                / layout.placements.len() as f64
        };

        let requested: Vec<f64> = layout
            .placements
            .iter()
            .filter(|p| p.adjacency.is_requested())
            .map(|p| p.adjacency.satisfaction())
            .collect();
        let mean_adjacency = if requested.is_empty() {
            1.0
        } else {
            requested.iter().sum::<f64>() / requested.len() as f64
        };

        let fraction_placed = layout.fraction_placed();
        let w = &self.weights;
        let total = (w.solar * mean_solar + w.placed * fraction_placed + w.adjacency * mean_adjacency)
            / (w.solar + w.placed + w.adjacency);

        LayoutScore {
            total,
            mean_solar,
            fraction_placed,
            mean_adjacency,
            shaded: layout
                .placements
                .iter()
                .zip(&shaded)
                .filter(|(_, s)| **s)
                .map(|(p, _)| p.spec_id.clone())
                .collect(),
        }
    }

    /// Which placements sit in a taller neighbour's winter-noon shadow
    ///
    /// A neighbour shades a placement when it is taller, lies on the
    /// placement's equator side, and is closer than its own shadow length.
    /// Placements without a height neither cast nor receive shade.
    fn shaded_placements(&self, layout: &Layout) -> Vec<bool> {
        let placements = &layout.placements;
        placements
            .iter()
            .map(|p| {
                let Some(own_height) = p.height else {
                    return false;
                };
                placements.iter().any(|q| {
                    let Some(height) = q.height else {
                        return false;
                    };
                    if q.spec_id == p.spec_id || height <= own_height {
                        return false;
                    }
                    let bearing = self.solar.local_to_azimuth(direction_deg(p.center(), q.center()));
                    if angular_distance_deg(bearing, self.solar.equator_azimuth_deg()) >= 90.0 {
                        return false;
                    }
                    let gap = polygon_distance(p.footprint.as_geo(), q.footprint.as_geo(), &self.tolerance);
                    gap < self.solar.winter_shadow_length(height)
                })
            })
            .collect()
    }

    /// Score every layout, rank, drop repeated arrangements and keep the
    /// best `top_n`
    pub fn select(&self, mut layouts: Vec<Layout>, top_n: usize) -> Vec<Layout> {
        for layout in &mut layouts {
            layout.score = self.score(layout);
        }

        layouts.sort_by_key(|l| {
            (
                Reverse(OrderedFloat(l.score.total)),
                Reverse(OrderedFloat(l.score.fraction_placed)),
                Reverse(OrderedFloat(l.score.mean_solar)),
                l.generation,
            )
        });

        let mut selected: Vec<Layout> = Vec::with_capacity(top_n.min(layouts.len()));
        for layout in layouts {
            if selected.len() == top_n {
                break;
            }
            if selected.iter().any(|s| s.same_arrangement(&layout)) {
                continue;
            }
            selected.push(layout);
        }
        selected
    }
}
