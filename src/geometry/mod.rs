//! Geometry kernel: validated polygons, predicates, buffering, bounds
//!
//! Everything here is a pure function over `geo` types. Tolerance handling is
//! centralised in [`Tolerance`]; no caller compares coordinates directly.

pub mod angle;
pub mod bounds;
pub mod buffer;
pub mod ops;
mod polygon;
mod tolerance;

pub use polygon::{signed_area, PolygonError, SitePolygon};
pub use tolerance::Tolerance;
