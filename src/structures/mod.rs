//! Structure specifications: what the caller wants placed
//!
//! A [`StructureSpec`] describes a rectangular footprint range, clearances,
//! how it may rotate, and optional soft preferences. Specs are validated once
//! per request before any search starts.

pub mod catalog;

pub use catalog::StructureKind;

use crate::core::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};

/// How a structure may be rotated during search
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Any angle on the configured rotation step
    #[default]
    Free,
    /// Primary edge parallel to the nearest parcel boundary edge
    FixedToParcelEdge,
    /// Exactly this angle, counter-clockwise from the local +x axis
    FixedAngle { degrees: f64 },
}

/// Soft preference to sit near a named anchor or another structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyPreference {
    /// Parcel anchor name, or the id of another structure
    pub anchor: String,
    pub max_distance: f64,
}

fn default_mandatory() -> bool {
    true
}

/// A structure to be placed
///
/// Width runs along the structure's primary edge (the rotation axis), depth
/// across it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSpec {
    pub id: String,
    #[serde(default)]
    pub kind: Option<StructureKind>,
    pub min_width: f64,
    pub max_width: f64,
    pub min_depth: f64,
    pub max_depth: f64,
    #[serde(default)]
    pub rotation: RotationPolicy,
    /// Minimum gap to any other structure
    #[serde(default)]
    pub structure_clearance: f64,
    /// Minimum gap to the parcel boundary, on top of the buildable region
    #[serde(default)]
    pub boundary_clearance: f64,
    #[serde(default)]
    pub adjacency: Option<AdjacencyPreference>,
    /// Lower values are placed first by the priority ordering
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
    /// Meters above grade; enables the shading heuristic
    #[serde(default)]
    pub height: Option<f64>,
}

impl StructureSpec {
    /// Fixed-size structure with free rotation and no clearances
    pub fn new(id: impl Into<String>, width: f64, depth: f64) -> Self {
        Self {
            id: id.into(),
            kind: None,
            min_width: width,
            max_width: width,
            min_depth: depth,
            max_depth: depth,
            rotation: RotationPolicy::Free,
            structure_clearance: 0.0,
            boundary_clearance: 0.0,
            adjacency: None,
            priority: None,
            mandatory: true,
            height: None,
        }
    }

    /// Spec populated from a catalog template
    pub fn from_template(id: impl Into<String>, kind: StructureKind) -> Self {
        let t = kind.template();
        Self {
            id: id.into(),
            kind: Some(kind),
            min_width: t.min_width,
            max_width: t.max_width,
            min_depth: t.min_depth,
            max_depth: t.max_depth,
            rotation: t.rotation,
            structure_clearance: t.structure_clearance,
            boundary_clearance: t.boundary_clearance,
            adjacency: None,
            priority: None,
            mandatory: t.mandatory,
            height: Some(t.height),
        }
    }

    pub fn with_size_range(mut self, min_width: f64, max_width: f64, min_depth: f64, max_depth: f64) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_clearances(mut self, structure: f64, boundary: f64) -> Self {
        self.structure_clearance = structure;
        self.boundary_clearance = boundary;
        self
    }

    pub fn with_adjacency(mut self, anchor: impl Into<String>, max_distance: f64) -> Self {
        self.adjacency = Some(AdjacencyPreference {
            anchor: anchor.into(),
            max_distance,
        });
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    pub fn min_area(&self) -> f64 {
        self.min_width * self.min_depth
    }

    pub fn max_area(&self) -> f64 {
        self.max_width * self.max_depth
    }

    /// Footprint sizes to try, largest first: maximum, midpoint, minimum.
    /// Fixed-size specs yield a single tier.
    pub fn size_tiers(&self) -> Vec<(f64, f64)> {
        let mut tiers: Vec<(f64, f64)> = Vec::with_capacity(3);
        for tier in [
            (self.max_width, self.max_depth),
            (
                (self.min_width + self.max_width) / 2.0,
                (self.min_depth + self.max_depth) / 2.0,
            ),
            (self.min_width, self.min_depth),
        ] {
            if !tiers.contains(&tier) {
                tiers.push(tier);
            }
        }
        tiers
    }

    /// Reject specs that cannot describe a real footprint
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            Err(PlannerError::InvalidStructureSpec {
                id: self.id.clone(),
                reason,
            })
        };

        if self.id.trim().is_empty() {
            return invalid("id must not be empty".into());
        }
        for (name, value) in [
            ("min_width", self.min_width),
            ("max_width", self.max_width),
            ("min_depth", self.min_depth),
            ("max_depth", self.max_depth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{} ({}) must be positive and finite", name, value));
            }
        }
        if self.min_width > self.max_width {
            return invalid(format!(
                "min_width ({}) exceeds max_width ({})",
                self.min_width, self.max_width
            ));
        }
        if self.min_depth > self.max_depth {
            return invalid(format!(
                "min_depth ({}) exceeds max_depth ({})",
                self.min_depth, self.max_depth
            ));
        }
        for (name, value) in [
            ("structure_clearance", self.structure_clearance),
            ("boundary_clearance", self.boundary_clearance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{} ({}) must be non-negative", name, value));
            }
        }
        if let RotationPolicy::FixedAngle { degrees } = self.rotation {
            if !degrees.is_finite() {
                return invalid("fixed rotation angle must be finite".into());
            }
        }
        if let Some(pref) = &self.adjacency {
            if !pref.max_distance.is_finite() || pref.max_distance < 0.0 {
                return invalid(format!(
                    "adjacency max_distance ({}) must be non-negative",
                    pref.max_distance
                ));
            }
            if pref.anchor == self.id {
                return invalid("structure cannot be adjacent to itself".into());
            }
        }
        if let Some(height) = self.height {
            if !height.is_finite() || height < 0.0 {
                return invalid(format!("height ({}) must be non-negative", height));
            }
        }
        Ok(())
    }
}
