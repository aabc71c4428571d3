//! Built-in structure templates
//!
//! Footprint ranges are typical residential sizes converted to meters.
//! Boundary clearances follow common accessory-structure rules of thumb.

use super::RotationPolicy;
use crate::parcel::FEET_TO_METERS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Home,
    Garage,
    Shed,
    Pool,
    Garden,
    Driveway,
    Patio,
    Workshop,
    Barn,
    Greenhouse,
}

/// Default dimensions and rules for one kind of structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureTemplate {
    pub name: &'static str,
    pub min_width: f64,
    pub max_width: f64,
    pub min_depth: f64,
    pub max_depth: f64,
    pub structure_clearance: f64,
    pub boundary_clearance: f64,
    pub rotation: RotationPolicy,
    /// Zero for ground-level features (pools, gardens, paving)
    pub height: f64,
    pub mandatory: bool,
}

impl StructureKind {
    pub const ALL: [StructureKind; 10] = [
        StructureKind::Home,
        StructureKind::Garage,
        StructureKind::Shed,
        StructureKind::Pool,
        StructureKind::Garden,
        StructureKind::Driveway,
        StructureKind::Patio,
        StructureKind::Workshop,
        StructureKind::Barn,
        StructureKind::Greenhouse,
    ];

    pub fn template(self) -> StructureTemplate {
        use StructureKind::*;
        let ft = FEET_TO_METERS;
        match self {
            Home => StructureTemplate {
                name: "Single Family Home",
                min_width: 10.0,
                max_width: 20.0,
                min_depth: 8.0,
                max_depth: 15.0,
                structure_clearance: 3.0,
                boundary_clearance: 0.0,
                rotation: RotationPolicy::Free,
                height: 7.5,
                mandatory: true,
            },
            Garage => StructureTemplate {
                name: "Detached Garage",
                min_width: 4.0,
                max_width: 10.0,
                min_depth: 5.0,
                max_depth: 11.0,
                structure_clearance: 1.5,
                boundary_clearance: 5.0 * ft,
                rotation: RotationPolicy::FixedToParcelEdge,
                height: 4.0,
                mandatory: true,
            },
            Shed => StructureTemplate {
                name: "Storage Shed",
                min_width: 2.4,
                max_width: 7.0,
                min_depth: 2.0,
                max_depth: 5.0,
                structure_clearance: 1.0,
                boundary_clearance: 3.0 * ft,
                rotation: RotationPolicy::Free,
                height: 2.5,
                mandatory: false,
            },
            Pool => StructureTemplate {
                name: "Swimming Pool",
                min_width: 5.0,
                max_width: 14.0,
                min_depth: 4.0,
                max_depth: 8.0,
                structure_clearance: 2.0,
                boundary_clearance: 10.0 * ft,
                rotation: RotationPolicy::Free,
                height: 0.0,
                mandatory: false,
            },
            Garden => StructureTemplate {
                name: "Garden Plot",
                min_width: 2.5,
                max_width: 18.0,
                min_depth: 2.0,
                max_depth: 10.0,
                structure_clearance: 0.5,
                boundary_clearance: 0.0,
                rotation: RotationPolicy::Free,
                height: 0.0,
                mandatory: false,
            },
            Driveway => StructureTemplate {
                name: "Driveway",
                min_width: 5.0,
                max_width: 15.0,
                min_depth: 3.0,
                max_depth: 6.0,
                structure_clearance: 0.0,
                boundary_clearance: 0.0,
                rotation: RotationPolicy::FixedToParcelEdge,
                height: 0.0,
                mandatory: true,
            },
            Patio => StructureTemplate {
                name: "Patio / Deck",
                min_width: 3.0,
                max_width: 12.0,
                min_depth: 2.5,
                max_depth: 6.0,
                structure_clearance: 0.0,
                boundary_clearance: 0.0,
                rotation: RotationPolicy::Free,
                height: 0.0,
                mandatory: false,
            },
            Workshop => StructureTemplate {
                name: "Workshop",
                min_width: 3.2,
                max_width: 12.0,
                min_depth: 3.0,
                max_depth: 6.0,
                structure_clearance: 1.5,
                boundary_clearance: 5.0 * ft,
                rotation: RotationPolicy::Free,
                height: 4.0,
                mandatory: false,
            },
            Barn => StructureTemplate {
                name: "Barn / Outbuilding",
                min_width: 5.0,
                max_width: 18.0,
                min_depth: 4.0,
                max_depth: 15.0,
                structure_clearance: 3.0,
                boundary_clearance: 10.0 * ft,
                rotation: RotationPolicy::Free,
                height: 6.0,
                mandatory: false,
            },
            Greenhouse => StructureTemplate {
                name: "Greenhouse",
                min_width: 3.0,
                max_width: 10.0,
                min_depth: 2.5,
                max_depth: 6.0,
                structure_clearance: 1.0,
                boundary_clearance: 3.0 * ft,
                rotation: RotationPolicy::Free,
                height: 3.0,
                mandatory: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::StructureSpec;

    #[test]
    fn test_every_template_is_valid() {
        for kind in StructureKind::ALL {
            let spec = StructureSpec::from_template(format!("{:?}", kind), kind);
            assert!(spec.validate().is_ok(), "{:?} template invalid", kind);
        }
    }

    #[test]
    fn test_ground_features_have_no_height() {
        assert_eq!(StructureKind::Pool.template().height, 0.0);
        assert!(StructureKind::Home.template().height > StructureKind::Shed.template().height);
    }
}
