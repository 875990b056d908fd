#![forbid(unsafe_code)]

//! `rule`: how one zone's division rule resolves and splits.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use zonage::expr::evaluate_condition;
use zonage::layout::{
    ResolvedRule, SizeCalculation, calculate_child_sizes_detailed, resolve_rule,
};
use zonage::{Axis, DivDir, ZonePath, ZoningState, direction_config};

use crate::document::DocumentArgs;
use crate::error::{CliError, Result};
use crate::output::write_json;

#[derive(Debug, Clone, Args)]
pub struct RuleArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Zone identifier, e.g. `0.1.2`.
    pub id: ZonePath,
}

/// Where a rule's template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum TemplateSource {
    Condition(usize),
    Default,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleReport {
    pub id: ZonePath,
    pub div_dir: DivDir,
    pub source: TemplateSource,
    #[serde(flatten)]
    pub resolved: ResolvedRule,
    /// Axis being split; `None` for inner zones.
    pub splitting_axis: Option<Axis>,
    /// Parent extent along the splitting axis, when the zone is rendered.
    pub extent: Option<f64>,
    pub sizes: Option<SizeCalculation>,
    pub children: usize,
}

/// Explain zone `id`'s rule under `state`.
pub fn explain_rule(state: &ZoningState, id: &ZonePath) -> Result<RuleReport> {
    let zone = state.root().find(id).ok_or_else(|| CliError::ZoneNotFound {
        id: id.to_string(),
    })?;
    let rule = &zone.lin_div;
    let values = state.values();

    let matched = if rule.conditions.is_empty() {
        None
    } else {
        rule.conditions
            .iter()
            .position(|condition| evaluate_condition(condition, values))
    };
    let source = match matched {
        Some(index) => TemplateSource::Condition(index),
        None if !rule.value_or_empty().is_empty() => TemplateSource::Default,
        None => TemplateSource::Missing,
    };

    let resolved = resolve_rule(rule, values);
    let splitting_axis = (zone.div_dir != DivDir::Inner)
        .then(|| direction_config(zone.div_dir, zone.hor_def_type, zone.div_elem).splitting_axis);
    let extent = splitting_axis
        .zip(state.locate(id))
        .map(|(axis, location)| location.size.get(axis));
    let sizes = extent.map(|extent| calculate_child_sizes_detailed(extent, &resolved.parsed));

    Ok(RuleReport {
        id: id.clone(),
        div_dir: zone.div_dir,
        source,
        resolved,
        splitting_axis,
        extent,
        sizes,
        children: zone.children.len(),
    })
}

pub fn run_rule(args: &RuleArgs, json: bool, out: &mut dyn Write) -> Result<()> {
    let state = args.document.load_state()?;
    let report = explain_rule(&state, &args.id)?;

    if json {
        return write_json(out, &report);
    }

    writeln!(out, "zone      {} ({})", report.id, report.div_dir)?;
    let source = match report.source {
        TemplateSource::Condition(index) => format!("condition #{index}"),
        TemplateSource::Default => "default value".to_owned(),
        TemplateSource::Missing => "none".to_owned(),
    };
    writeln!(out, "template  {source}")?;
    writeln!(out, "division  {:?}", report.resolved.division_string)?;
    writeln!(
        out,
        "parts     {} ({} children)",
        report.resolved.parsed.partition_count(),
        report.children
    )?;
    match (report.splitting_axis, report.extent, &report.sizes) {
        (Some(axis), Some(extent), Some(sizes)) => {
            writeln!(out, "split     {axis} over {extent:.1}")?;
            let sizes: Vec<String> = sizes.sizes.iter().map(|s| format!("{s:.1}")).collect();
            writeln!(out, "sizes     {}", sizes.join(" : "))?;
        }
        (Some(axis), _, _) => writeln!(out, "split     {axis} (zone not rendered)")?,
        (None, _, _) => writeln!(out, "split     layered, every part fills the zone")?,
    }
    Ok(())
}
