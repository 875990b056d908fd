#![forbid(unsafe_code)]

//! zonage public facade crate.
//!
//! This crate provides the stable surface area for users. It re-exports
//! the common types of the layer crates, owns the unified error model, and
//! offers an explicit application state ([`ZoningState`]) in place of any
//! shared mutable context.
//!
//! # Layers
//! - `zonage-core`: zone tree, geometry, identifiers.
//! - `zonage-expr`: arithmetic, variables, conditions.
//! - `zonage-layout`: division rules, sizes, the recursive walk.

pub mod error;
pub mod randomize;
pub mod selection;
pub mod state;

// --- Core re-exports -------------------------------------------------------

pub use zonage_core::{
    Axis, Box3, Comparison, ComparisonOperator, Condition, ConditionOperation, DivDir, DivElem,
    HorDefType, LinDiv, ModelError, UNIT_MARKER, Vec3, Zone, ZonePath, ZoneSide, ZoningData,
};

// --- Expression re-exports -------------------------------------------------

pub use zonage_expr::{
    DEFAULT_DIMENSION, ExprError, ResolveOptions, VariableMap, VariableResolver,
    evaluate_expression, extract_all_variables, find_matching_condition, resolve_dimension,
    resolve_dimensions, resolve_variables, validate_comparison,
};

// --- Layout re-exports -----------------------------------------------------

pub use zonage_layout::{
    ChildLayout, DirectionConfig, LayoutError, ParsedDivision, ZoneLocation, ZonePlacement,
    ZoneWalker, calculate_child_sizes, direction_config, parse_division_rule_with_variables,
    parse_division_string, validate_division_string,
};

// --- Facade ----------------------------------------------------------------

pub use error::{DegradationAction, Error, Result};
pub use randomize::ValueRange;
pub use selection::{SelectedZone, ZoneInteraction};
pub use state::ZoningState;

/// Everyday imports.
pub mod prelude {
    pub use crate::{
        Axis, Box3, DivDir, Error, Result, Vec3, Zone, ZonePath, ZoneSide, ZoningData,
        ZoningState,
    };
}

pub use zonage_core as core;
pub use zonage_expr as expr;
pub use zonage_layout as layout;
