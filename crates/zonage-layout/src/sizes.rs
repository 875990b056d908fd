#![forbid(unsafe_code)]

//! Child sizes along the splitting axis.
//!
//! Fixed slots are served first. Ratio slots share what is left in
//! proportion to their weights. When the fixed slots alone exceed the
//! parent, every fixed slot is scaled down proportionally and ratio slots
//! get nothing.

use serde::Serialize;
use zonage_core::LinDiv;
use zonage_expr::VariableMap;

use crate::LayoutError;
use crate::division::{FIXED_SLOT, ParsedDivision, parse_division_string, resolve_rule};

/// Sizes for `parent_size` split by parallel `ratios` / `fixed_sizes`.
///
/// The result always has `ratios.len()` entries.
pub fn calculate_sizes_from_parsed_division(
    parent_size: f64,
    ratios: &[f64],
    fixed_sizes: &[f64],
) -> Vec<f64> {
    let fixed_at = |i: usize| fixed_sizes.get(i).copied().unwrap_or(0.0);
    let total_fixed: f64 = (0..ratios.len()).map(|i| fixed_at(i).max(0.0)).sum();

    if total_fixed > parent_size {
        tracing::warn!(
            total_fixed,
            parent_size,
            "fixed sizes exceed parent size, scaling down"
        );
        let scale = parent_size / total_fixed;
        return (0..ratios.len())
            .map(|i| {
                let size = fixed_at(i);
                if size > 0.0 { size * scale } else { 0.0 }
            })
            .collect();
    }

    let remaining = parent_size - total_fixed;
    let ratio_sum: f64 = ratios.iter().filter(|&&r| r != FIXED_SLOT).sum();

    if ratio_sum == 0.0 && total_fixed > 0.0 {
        return (0..ratios.len()).map(fixed_at).collect();
    }
    if ratio_sum == 0.0 {
        let share = parent_size / ratios.len() as f64;
        return vec![share; ratios.len()];
    }

    ratios
        .iter()
        .enumerate()
        .map(|(i, &ratio)| {
            if ratio == FIXED_SLOT {
                fixed_at(i)
            } else {
                remaining * ratio / ratio_sum
            }
        })
        .collect()
}

/// Sizes plus the figures they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeCalculation {
    pub sizes: Vec<f64>,
    pub total_fixed: f64,
    /// Sum of the positive ratio weights.
    pub ratio_sum: f64,
    pub partition_count: usize,
}

/// [`calculate_sizes_from_parsed_division`] with its figures.
pub fn calculate_child_sizes_detailed(parent_size: f64, parsed: &ParsedDivision) -> SizeCalculation {
    SizeCalculation {
        sizes: calculate_sizes_from_parsed_division(
            parent_size,
            &parsed.ratios,
            &parsed.fixed_sizes,
        ),
        total_fixed: parsed.total_fixed(),
        ratio_sum: parsed.ratios.iter().filter(|&&r| r > 0.0).sum(),
        partition_count: parsed.partition_count(),
    }
}

/// [`calculate_child_sizes_detailed`] refusing to scale fixed slots down.
pub fn try_calculate_child_sizes(
    parent_size: f64,
    parsed: &ParsedDivision,
) -> Result<SizeCalculation, LayoutError> {
    if parsed.partition_count() == 0 {
        return Err(LayoutError::NoPartitions);
    }
    let total_fixed = parsed.total_fixed();
    if total_fixed > parent_size {
        return Err(LayoutError::FixedOverflow {
            total_fixed,
            parent_size,
        });
    }
    Ok(calculate_child_sizes_detailed(parent_size, parsed))
}

/// Sizes for a division string; an empty string yields `[parent_size]`.
pub fn calculate_child_sizes_from_string(parent_size: f64, division: &str) -> Vec<f64> {
    if division.is_empty() {
        return vec![parent_size];
    }
    let parsed = parse_division_string(division);
    calculate_sizes_from_parsed_division(parent_size, &parsed.ratios, &parsed.fixed_sizes)
}

/// Sizes for a rule resolved against `variables`.
pub fn calculate_child_sizes(parent_size: f64, rule: &LinDiv, variables: &VariableMap) -> Vec<f64> {
    let resolved = resolve_rule(rule, variables);
    calculate_child_sizes_from_string(parent_size, &resolved.division_string)
}
