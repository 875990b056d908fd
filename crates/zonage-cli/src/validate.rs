#![forbid(unsafe_code)]

//! `validate`: static and evaluated checks over a whole document.
//!
//! Errors are problems the layout silently papers over (an unparsable
//! division string, a comparison without a key, a variable nobody
//! defines). Warnings are places where the layout adapts: fixed parts
//! scaled down to fit, or children beyond the partition count dropped.

use std::fmt;
use std::io::Write;

use clap::Args;
use serde::Serialize;
use zonage::layout::{LayoutError, resolve_rule, try_calculate_child_sizes};
use zonage::{
    DivDir, Zone, ZonePath, ZoningState, direction_config, extract_all_variables,
    validate_comparison, validate_division_string,
};

use crate::document::DocumentArgs;
use crate::error::{CliError, Result};
use crate::output::write_json;

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Fail on warnings too.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZonePath>,
    pub message: String,
}

impl Issue {
    fn error(zone: Option<&ZonePath>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            zone: zone.cloned(),
            message: message.into(),
        }
    }

    fn warning(zone: &ZonePath, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            zone: Some(zone.clone()),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Issues about zone `id`.
    pub fn for_zone<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues
            .iter()
            .filter(move |issue| issue.zone.as_ref().is_some_and(|z| z.as_str() == id))
    }
}

fn check_zone(state: &ZoningState, zone: &Zone, issues: &mut Vec<Issue>) {
    let id = &zone.index;
    for (n, condition) in zone.lin_div.conditions.iter().enumerate() {
        for comparison in &condition.comparisons {
            for problem in validate_comparison(comparison) {
                issues.push(Issue::error(Some(id), format!("condition #{n}: {problem}")));
            }
        }
    }

    let resolved = resolve_rule(&zone.lin_div, state.values());
    if !validate_division_string(&resolved.division_string) {
        issues.push(Issue::error(
            Some(id),
            format!("invalid division string {:?}", resolved.division_string),
        ));
        return;
    }
    if zone.empty || zone.children.is_empty() {
        return;
    }

    let partitions = resolved.parsed.partition_count();
    if zone.children.len() > partitions {
        issues.push(Issue::warning(
            id,
            format!(
                "{} children for {partitions} partition(s), extra children ignored",
                zone.children.len()
            ),
        ));
    }

    if zone.div_dir == DivDir::Inner {
        return;
    }
    let axis = direction_config(zone.div_dir, zone.hor_def_type, zone.div_elem).splitting_axis;
    let Some(location) = state.locate(id) else {
        return;
    };
    if let Err(LayoutError::FixedOverflow {
        total_fixed,
        parent_size,
    }) = try_calculate_child_sizes(location.size.get(axis), &resolved.parsed)
    {
        issues.push(Issue::warning(
            id,
            format!(
                "fixed parts need {total_fixed:.1} along {axis} but only {parent_size:.1} is available, scaled down"
            ),
        ));
    }
}

/// Check every zone of `state`'s document.
pub fn validate_state(state: &ZoningState) -> ValidationReport {
    let _span = tracing::debug_span!("validate").entered();
    let data = state.data();
    let mut issues = Vec::new();

    for name in extract_all_variables(data) {
        if !data.variables.contains_key(&name) {
            issues.push(Issue::error(None, format!("undefined variable ${name}")));
        }
    }
    for zone in state.root().iter() {
        check_zone(state, zone, &mut issues);
    }

    let report = ValidationReport { issues };
    tracing::debug!(
        errors = report.errors(),
        warnings = report.warnings(),
        "validation finished"
    );
    report
}

pub fn run_validate(args: &ValidateArgs, json: bool, out: &mut dyn Write) -> Result<()> {
    let state = args.document.load_state()?;
    let report = validate_state(&state);

    if json {
        write_json(out, &report)?;
    } else {
        for issue in &report.issues {
            match &issue.zone {
                Some(zone) => writeln!(out, "{}: zone {zone}: {}", issue.severity, issue.message)?,
                None => writeln!(out, "{}: {}", issue.severity, issue.message)?,
            }
        }
        writeln!(
            out,
            "{} error(s), {} warning(s)",
            report.errors(),
            report.warnings()
        )?;
    }

    let failing = if args.strict {
        report.issues.len()
    } else {
        report.errors()
    };
    if failing > 0 {
        return Err(CliError::Invalid { count: failing });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonage::{Comparison, ComparisonOperator, Condition, ConditionOperation, LinDiv, ZoningData};

    fn state(zone: Zone, variables: &[(&str, &str)]) -> ZoningState {
        ZoningState::new(ZoningData {
            zone,
            width: "1000mm".into(),
            height: "1000mm".into(),
            depth: "1000mm".into(),
            variables: variables
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        })
    }

    #[test]
    fn clean_document_has_no_issues() {
        let zone = Zone::new("0", DivDir::Vertical).rule("$A mm:1").children([
            Zone::new("0.0", DivDir::Vertical),
            Zone::new("0.1", DivDir::Vertical),
        ]);
        let report = validate_state(&state(zone, &[("A", "200")]));
        assert_eq!(report, ValidationReport::default());
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let zone = Zone::new("0", DivDir::Vertical).rule("$MISSING mm:1");
        let report = validate_state(&state(zone, &[]));
        assert_eq!(report.errors(), 1);
        assert_eq!(report.issues[0].message, "undefined variable $MISSING");
        assert_eq!(report.issues[0].zone, None);
    }

    #[test]
    fn overflow_and_extra_children_are_warnings() {
        let zone = Zone::new("0", DivDir::Vertical)
            .rule("800mm:400mm")
            .children([
                Zone::new("0.0", DivDir::Vertical),
                Zone::new("0.1", DivDir::Vertical),
                Zone::new("0.2", DivDir::Vertical),
            ]);
        let report = validate_state(&state(zone, &[]));
        assert_eq!(report.errors(), 0);
        assert_eq!(report.warnings(), 2);
        let messages: Vec<&str> = report.for_zone("0").map(|i| i.message.as_str()).collect();
        assert!(messages[0].contains("extra children ignored"));
        assert!(messages[1].contains("1200.0"));
        assert!(messages[1].contains("scaled down"));
    }

    #[test]
    fn empty_zones_skip_partition_checks() {
        let zone = Zone::new("0", DivDir::Vertical).empty(true).children([
            Zone::new("0.0", DivDir::Vertical),
            Zone::new("0.1", DivDir::Vertical),
        ]);
        assert_eq!(validate_state(&state(zone, &[])).issues, Vec::new());
    }

    #[test]
    fn keyless_comparison_is_an_error() {
        let rule = LinDiv::new("1").condition(Condition::new(
            "1:1",
            ConditionOperation::All,
            vec![Comparison::new(" ", ComparisonOperator::Eq, "1")],
        ));
        let zone = Zone::new("0", DivDir::Vertical).lin_div(rule);
        let report = validate_state(&state(zone, &[]));
        assert_eq!(report.errors(), 1);
        assert_eq!(report.issues[0].message, "condition #0: Comparison key is required");
        assert_eq!(report.issues[0].zone, Some(ZonePath::root()));
    }
}
