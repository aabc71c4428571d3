//! Site Planner - setback-aware, solar-oriented structure placement
//!
//! Given a parcel boundary, setback rules and a list of structures, the
//! engine searches for legal placements and ranks complete layouts by solar
//! exposure, coverage and adjacency.

pub mod core;
pub mod geometry;
pub mod layout;
pub mod parcel;
pub mod planner;
pub mod search;
pub mod solar;
pub mod structures;
pub mod validation;

pub use crate::core::config::EngineConfig;
pub use crate::core::error::{PlannerError, Result};
pub use layout::{EnergyInput, Layout, PlanReport, Placement};
pub use parcel::{Parcel, ParcelInput, SetbackRules, Setbacks};
pub use planner::{plan, PlanRequest, Planner};
pub use search::{OrderingKind, OrderingStrategy};
pub use solar::{SolarEvaluator, SolarScore};
pub use structures::{RotationPolicy, StructureKind, StructureSpec};
