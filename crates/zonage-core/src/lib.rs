#![forbid(unsafe_code)]

//! Core: geometry, the zone tree model, and zone identifiers.
//!
//! # Role in zonage
//! `zonage-core` is the data layer. It owns the structural input (the zone
//! tree and its division rules), the three-dimensional box primitives the
//! layout engine produces, and the dot-path identifiers used to address
//! zones.
//!
//! # Primary responsibilities
//! - **Zone / LinDiv / Condition**: the immutable tree and its rules, with
//!   the serde wire format of zoning documents.
//! - **Vec3 / Box3 / Axis**: centre-and-size boxes in a single linear unit.
//! - **ZonePath**: segment-aware ancestor/descendant queries.
//!
//! # How it fits in the system
//! `zonage-expr` evaluates the textual parts of the model, `zonage-layout`
//! turns a tree plus resolved variables into [`Box3`] placements, and the
//! `zonage` facade wraps everything in an explicit application state.

pub mod error;
pub mod geometry;
pub mod model;
pub mod path;

pub use error::ModelError;
pub use geometry::{Axis, Box3, Vec3};
pub use model::{
    Comparison, ComparisonOperator, Condition, ConditionOperation, DivDir, DivElem, HorDefType,
    LinDiv, Zone, ZoneSide, ZoningData,
};
pub use path::ZonePath;

/// The single linear unit marker accepted in division strings and dimensions.
pub const UNIT_MARKER: &str = "mm";
