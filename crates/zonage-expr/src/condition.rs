#![forbid(unsafe_code)]

//! Conditional rule selection.

use zonage_core::{Comparison, Condition, ConditionOperation};

use crate::math::compare_values;
use crate::variables::{VariableMap, evaluate_expression};

/// Evaluate both sides of a comparison and compare them.
pub fn evaluate_comparison(comparison: &Comparison, variables: &VariableMap) -> bool {
    let actual = evaluate_expression(&comparison.key, variables);
    let expected = evaluate_expression(&comparison.value, variables);
    compare_values(actual, expected, comparison.operator)
}

/// Whether a condition holds.
///
/// A condition without comparisons always holds. Otherwise
/// [`ConditionOperation::All`] requires every comparison,
/// [`ConditionOperation::Any`] at least one, and an unknown operation never
/// holds.
pub fn evaluate_condition(condition: &Condition, variables: &VariableMap) -> bool {
    if condition.comparisons.is_empty() {
        return true;
    }
    let mut comparisons = condition.comparisons.iter();
    match condition.operation {
        ConditionOperation::All => comparisons.all(|c| evaluate_comparison(c, variables)),
        ConditionOperation::Any => comparisons.any(|c| evaluate_comparison(c, variables)),
        ConditionOperation::Unknown(flag) => {
            tracing::debug!(flag, "condition with unknown operation never matches");
            false
        }
    }
}

/// First condition, in declaration order, that holds.
pub fn find_matching_condition<'a>(
    conditions: &'a [Condition],
    variables: &VariableMap,
) -> Option<&'a Condition> {
    conditions
        .iter()
        .find(|condition| evaluate_condition(condition, variables))
}

/// Problems with a comparison's text, empty when it is well formed.
pub fn validate_comparison(comparison: &Comparison) -> Vec<String> {
    let mut errors = Vec::new();
    if comparison.key.trim().is_empty() {
        errors.push("Comparison key is required".to_owned());
    }
    if comparison.value.trim().is_empty() {
        errors.push("Comparison value is required".to_owned());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonage_core::ComparisonOperator;

    fn vars(pairs: &[(&str, f64)]) -> VariableMap {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    fn cmp(key: &str, op: ComparisonOperator, value: &str) -> Comparison {
        Comparison::new(key, op, value)
    }

    #[test]
    fn comparison_evaluates_both_sides() {
        let v = vars(&[("A", 3.0), ("B", 1.5)]);
        assert!(evaluate_comparison(
            &cmp("$A", ComparisonOperator::Eq, "$B * 2"),
            &v
        ));
        assert!(!evaluate_comparison(
            &cmp("$A", ComparisonOperator::Lt, "$B"),
            &v
        ));
    }

    #[test]
    fn all_and_any() {
        let v = vars(&[("IS_OPEN", 1.0), ("CNT", 4.0)]);
        let comps = vec![
            cmp("$IS_OPEN", ComparisonOperator::Eq, "1"),
            cmp("$CNT", ComparisonOperator::Gt, "10"),
        ];
        let all = Condition::new("1", ConditionOperation::All, comps.clone());
        let any = Condition::new("1", ConditionOperation::Any, comps.clone());
        let unknown = Condition::new("1", ConditionOperation::Unknown(7), comps);
        assert!(!evaluate_condition(&all, &v));
        assert!(evaluate_condition(&any, &v));
        assert!(!evaluate_condition(&unknown, &v));
    }

    #[test]
    fn empty_comparisons_hold() {
        let cond = Condition::new("1:1", ConditionOperation::Unknown(9), Vec::new());
        assert!(evaluate_condition(&cond, &VariableMap::new()));
    }

    #[test]
    fn first_match_wins() {
        let v = vars(&[("X", 5.0)]);
        let conditions = vec![
            Condition::new(
                "first",
                ConditionOperation::All,
                vec![cmp("$X", ComparisonOperator::Gt, "100")],
            ),
            Condition::new(
                "second",
                ConditionOperation::All,
                vec![cmp("$X", ComparisonOperator::Ge, "5")],
            ),
            Condition::new(
                "third",
                ConditionOperation::All,
                vec![cmp("$X", ComparisonOperator::Ne, "0")],
            ),
        ];
        let hit = find_matching_condition(&conditions, &v).map(|c| c.value.as_str());
        assert_eq!(hit, Some("second"));
        assert!(find_matching_condition(&[], &v).is_none());
    }

    #[test]
    fn validation_reports_missing_sides() {
        let errors = validate_comparison(&cmp(" ", ComparisonOperator::Eq, ""));
        assert_eq!(
            errors,
            ["Comparison key is required", "Comparison value is required"]
        );
        assert!(validate_comparison(&cmp("$A", ComparisonOperator::Eq, "1")).is_empty());
    }
}
