#![forbid(unsafe_code)]

//! `$NAME` substitution and division-string normalization.
//!
//! Variable references are written `$` followed by word characters
//! (`[A-Za-z0-9_]`). A reference to a name that is not bound reads as `0`;
//! it is never an error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use zonage_core::{LinDiv, ZoningData};

use crate::error::ExprError;
use crate::math::{evaluate_math, evaluate_simple_arithmetic, format_number, try_evaluate_math};

/// Resolved variable values by name.
pub type VariableMap = BTreeMap<String, f64>;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| unreachable!("static pattern {pattern}: {err}"))
}

static VARIABLE_REF: LazyLock<Regex> = LazyLock::new(|| compile(r"\$(\w+)"));
static INNER_PARENS: LazyLock<Regex> = LazyLock::new(|| compile(r"\(([^()]+)\)"));

/// Binary `$A op $B` patterns, applied in this order.
static BINARY_PATTERNS: LazyLock<[(char, Regex); 4]> = LazyLock::new(|| {
    [
        ('/', compile(r"\$(\w+)\s*/\s*\$(\w+)")),
        ('*', compile(r"\$(\w+)\s*\*\s*\$(\w+)")),
        ('+', compile(r"\$(\w+)\s*\+\s*\$(\w+)")),
        ('-', compile(r"\$(\w+)\s*-\s*\$(\w+)")),
    ]
});

/// Replace every `$NAME` with its value; unbound names become `0`.
pub fn substitute_variables(expr: &str, variables: &VariableMap) -> String {
    VARIABLE_REF
        .replace_all(expr, |caps: &Captures<'_>| {
            variables
                .get(&caps[1])
                .map_or_else(|| "0".to_owned(), |v| format_number(*v))
        })
        .into_owned()
}

/// Fold `$A op $B` pairs, one operator class at a time (`/`, `*`, `+`, `-`).
///
/// An unbound operand reads as `0`, except the divisor of `/` which reads
/// as `1`.
pub fn replace_variable_expressions(expr: &str, variables: &VariableMap) -> String {
    let mut text = expr.to_owned();
    for (op, pattern) in BINARY_PATTERNS.iter() {
        text = pattern
            .replace_all(&text, |caps: &Captures<'_>| {
                let lhs = variables.get(&caps[1]).copied().unwrap_or(0.0);
                let rhs_default = if *op == '/' { 1.0 } else { 0.0 };
                let rhs = variables.get(&caps[2]).copied().unwrap_or(rhs_default);
                let result = match op {
                    '/' => lhs / rhs,
                    '*' => lhs * rhs,
                    '+' => lhs + rhs,
                    _ => lhs - rhs,
                };
                format_number(result)
            })
            .into_owned();
    }
    text
}

/// Evaluate an expression over variables, reporting why it failed.
pub fn try_evaluate_expression(expr: &str, variables: &VariableMap) -> Result<f64, ExprError> {
    if expr.trim().is_empty() {
        return Err(ExprError::Empty);
    }
    let substituted = substitute_variables(expr, variables);
    let folded = replace_variable_expressions(&substituted, variables);
    try_evaluate_math(&folded)
}

/// Evaluate an expression over variables; `0` on any failure.
pub fn evaluate_expression(expr: &str, variables: &VariableMap) -> f64 {
    if expr.trim().is_empty() {
        return 0.0;
    }
    let substituted = substitute_variables(expr, variables);
    let folded = replace_variable_expressions(&substituted, variables);
    evaluate_math(&folded)
}

/// Normalize a division-rule template into a division string.
///
/// Variables are substituted, innermost parenthesized groups are replaced by
/// their value, and literal `a op b` pairs are folded once. Unit markers,
/// colons and repetition braces pass through untouched.
pub fn evaluate_division_expression(expr: &str, variables: &VariableMap) -> String {
    let substituted = substitute_variables(expr, variables);
    let folded = replace_variable_expressions(&substituted, variables);
    let grouped = INNER_PARENS
        .replace_all(&folded, |caps: &Captures<'_>| {
            match try_evaluate_math(&caps[1]) {
                Ok(value) => format_number(value),
                Err(ExprError::Empty | ExprError::NonFinite { .. }) => {
                    format_number(evaluate_math(&caps[1]))
                }
                Err(err) => {
                    tracing::warn!(
                        group = &caps[0],
                        error = %err,
                        "could not evaluate parenthesized group, keeping it"
                    );
                    caps[0].to_owned()
                }
            }
        })
        .into_owned();
    evaluate_simple_arithmetic(&grouped)
}

/// Evaluate every raw entry against an already-resolved map.
///
/// This is a single pass; see [`crate::resolve_variables`] for resolving a
/// map whose entries reference each other.
pub fn parse_variables(raw: &BTreeMap<String, String>, globals: &VariableMap) -> VariableMap {
    raw.iter()
        .map(|(name, text)| (name.clone(), evaluate_expression(text, globals)))
        .collect()
}

/// Names referenced with `$NAME` in `text`.
pub fn extract_variable_names(text: &str) -> BTreeSet<String> {
    VARIABLE_REF
        .captures_iter(text)
        .map(|caps| caps[1].to_owned())
        .collect()
}

/// Names referenced anywhere in a division rule: its default value, each
/// condition's value, and both sides of every comparison.
pub fn extract_variables_from_division_rule(rule: &LinDiv) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    if let Some(value) = &rule.value {
        names.extend(extract_variable_names(value));
    }
    for condition in &rule.conditions {
        names.extend(extract_variable_names(&condition.value));
        for comparison in &condition.comparisons {
            names.extend(extract_variable_names(&comparison.key));
            names.extend(extract_variable_names(&comparison.value));
        }
    }
    names
}

/// Every variable name a document mentions: declared names, names used by
/// variable definitions and dimensions, and names used by any rule.
pub fn extract_all_variables(data: &ZoningData) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = data.variables.keys().cloned().collect();
    for text in data.variables.values() {
        names.extend(extract_variable_names(text));
    }
    for dim in [&data.width, &data.height, &data.depth] {
        names.extend(extract_variable_names(dim));
    }
    for zone in data.zone.iter() {
        names.extend(extract_variables_from_division_rule(&zone.lin_div));
    }
    names
}
