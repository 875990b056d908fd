#![forbid(unsafe_code)]

//! Expression layer: arithmetic, variables, and rule conditions.
//!
//! # Role in zonage
//! Division rules and dimensions are written in a restricted arithmetic
//! micro-language over `$NAME` variables. This crate turns that text into
//! numbers (or normalized division strings) and resolves the variable map
//! itself, whose entries may reference each other.
//!
//! # Primary responsibilities
//! - **math**: tokenizer and recursive-descent evaluator for `+ - * /` and
//!   parentheses, millimetre literal extraction, tolerant comparison.
//! - **variables**: `$NAME` substitution, division-string normalization,
//!   variable name extraction.
//! - **resolve**: order-independent resolution of the raw variable map and
//!   of the overall dimensions.
//! - **condition**: first-match selection of conditional rules.
//!
//! # Failure policy
//! Malformed text never propagates an error to layout code: the infallible
//! entry points log a `tracing` warning and evaluate to `0`. Fallible
//! `try_*` twins exist for callers that need to know.

pub mod condition;
pub mod dep_graph;
pub mod error;
pub mod math;
pub mod resolve;
pub mod variables;

pub use condition::{
    evaluate_comparison, evaluate_condition, find_matching_condition, validate_comparison,
};
pub use error::ExprError;
pub use math::{
    FLOATING_POINT_TOLERANCE, compare_values, compare_values_raw, evaluate_math,
    evaluate_simple_arithmetic, extract_millimeter_value, try_evaluate_math,
};
pub use resolve::{
    DEFAULT_DIMENSION, ResolveOptions, VariableResolver, is_expression, recompute_variables,
    resolve_dimension, resolve_dimension_or, resolve_dimensions, resolve_variables,
};
pub use variables::{
    VariableMap, evaluate_division_expression, evaluate_expression, extract_all_variables,
    extract_variable_names, extract_variables_from_division_rule, parse_variables,
    replace_variable_expressions, substitute_variables, try_evaluate_expression,
};
