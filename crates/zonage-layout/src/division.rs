#![forbid(unsafe_code)]

//! Division rules and division strings.
//!
//! A division string is a colon-separated list of parts:
//!
//! | Part        | Meaning                                |
//! |-------------|----------------------------------------|
//! | `2`         | ratio slot with weight 2               |
//! | `500mm`     | fixed slot of 500 units                |
//! | `3*{1}`     | three copies of the inner part         |
//!
//! Parsing produces two parallel arrays, `ratios` and `fixed_sizes`, of equal
//! length. A fixed slot carries [`FIXED_SLOT`] in `ratios`.

use serde::Serialize;
use zonage_core::{LinDiv, UNIT_MARKER};
use zonage_expr::{
    VariableMap, evaluate_division_expression, extract_millimeter_value, find_matching_condition,
};

/// Ratio sentinel marking a fixed-size slot.
pub const FIXED_SLOT: f64 = -1.0;

/// Upper bound on the count of a `N*{..}` repetition.
pub const MAX_REPETITION: usize = 10_000;

/// One slot of a parsed division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// Share of the space left after fixed slots.
    Ratio(f64),
    /// Literal length.
    Fixed(f64),
}

/// Parallel ratio / fixed-size arrays of a division string.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDivision {
    pub ratios: Vec<f64>,
    pub fixed_sizes: Vec<f64>,
}

impl ParsedDivision {
    /// A single full-size partition.
    #[must_use]
    pub fn single() -> Self {
        Self {
            ratios: vec![1.0],
            fixed_sizes: vec![0.0],
        }
    }

    fn push(&mut self, slot: Slot) {
        match slot {
            Slot::Ratio(r) => {
                self.ratios.push(r);
                self.fixed_sizes.push(0.0);
            }
            Slot::Fixed(len) => {
                self.ratios.push(FIXED_SLOT);
                self.fixed_sizes.push(len);
            }
        }
    }

    /// Number of partitions.
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.ratios.len()
    }

    /// Sum of the positive fixed sizes.
    #[must_use]
    pub fn total_fixed(&self) -> f64 {
        self.fixed_sizes.iter().map(|s| s.max(0.0)).sum()
    }

    /// Sum of the ratio slots' weights.
    #[must_use]
    pub fn ratio_sum(&self) -> f64 {
        self.ratios.iter().filter(|&&r| r != FIXED_SLOT).sum()
    }

    /// Slots in order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.ratios
            .iter()
            .zip(&self.fixed_sizes)
            .map(|(&r, &len)| {
                if r == FIXED_SLOT {
                    Slot::Fixed(len)
                } else {
                    Slot::Ratio(r)
                }
            })
    }
}

impl FromIterator<Slot> for ParsedDivision {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        let mut parsed = Self::default();
        for slot in iter {
            parsed.push(slot);
        }
        parsed
    }
}

/// Split `N*{PART}` into its count and inner part.
fn parse_repetition(part: &str) -> Option<(usize, &str)> {
    let body = part.strip_suffix('}')?;
    let (count, inner) = body.split_once("*{")?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) || inner.is_empty() {
        return None;
    }
    let count = count.parse::<usize>().unwrap_or(usize::MAX);
    Some((count, inner.trim()))
}

/// Ratio weight of a plain part: empty reads as `0`, non-numeric as `1`.
fn parse_ratio(part: &str) -> f64 {
    if part.is_empty() {
        return 0.0;
    }
    match part.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 1.0,
    }
}

fn parse_slot(part: &str) -> Slot {
    if part.contains(UNIT_MARKER) {
        Slot::Fixed(extract_millimeter_value(part))
    } else {
        Slot::Ratio(parse_ratio(part))
    }
}

/// Parse a division string.
///
/// An empty string is one full-size partition.
pub fn parse_division_string(division: &str) -> ParsedDivision {
    if division.is_empty() {
        return ParsedDivision::single();
    }
    let mut parsed = ParsedDivision::default();
    for part in division.split(':').map(str::trim) {
        match parse_repetition(part) {
            Some((count, inner)) => {
                let count = if count > MAX_REPETITION {
                    tracing::warn!(
                        part,
                        limit = MAX_REPETITION,
                        "repetition count too large, clamping"
                    );
                    MAX_REPETITION
                } else {
                    count
                };
                let slot = parse_slot(inner);
                for _ in 0..count {
                    parsed.push(slot);
                }
            }
            None => parsed.push(parse_slot(part)),
        }
    }
    parsed
}

/// Effective division string of a rule.
///
/// With conditions, the first matching condition's template is used, then
/// the default value, then nothing. Without conditions the default value
/// is used directly.
pub fn parse_division_rule_with_variables(rule: &LinDiv, variables: &VariableMap) -> String {
    if !rule.conditions.is_empty()
        && let Some(condition) = find_matching_condition(&rule.conditions, variables)
    {
        return evaluate_division_expression(&condition.value, variables);
    }
    match rule.value.as_deref() {
        Some(value) if !value.is_empty() => evaluate_division_expression(value, variables),
        _ => String::new(),
    }
}

/// A rule's division string together with its parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRule {
    pub division_string: String,
    pub parsed: ParsedDivision,
}

/// Resolve and parse a rule in one step.
pub fn resolve_rule(rule: &LinDiv, variables: &VariableMap) -> ResolvedRule {
    let division_string = parse_division_rule_with_variables(rule, variables);
    let parsed = parse_division_string(&division_string);
    ResolvedRule {
        division_string,
        parsed,
    }
}

fn is_valid_part(part: &str) -> bool {
    part.ends_with(UNIT_MARKER) || part.is_empty() || part.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Whether every part is a unit-suffixed length or a number.
pub fn validate_division_string(division: &str) -> bool {
    if division.is_empty() {
        return true;
    }
    division.split(':').map(str::trim).all(|part| match parse_repetition(part) {
        Some((_, inner)) => is_valid_part(inner),
        None => is_valid_part(part),
    })
}

/// Validate a rule's literal default value.
///
/// Templates that reference variables are only meaningful once normalized;
/// validate the output of [`parse_division_rule_with_variables`] for those.
pub fn validate_division_rule(rule: &LinDiv) -> bool {
    rule.value.as_deref().is_none_or(validate_division_string)
}
