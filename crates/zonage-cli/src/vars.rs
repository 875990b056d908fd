#![forbid(unsafe_code)]

//! `vars`: resolved variable values and overall dimensions.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use zonage::Vec3;
use zonage::expr::is_expression;

use crate::document::DocumentArgs;
use crate::error::Result;
use crate::output::{extent, write_json};

#[derive(Debug, Clone, Args)]
pub struct VarsArgs {
    #[command(flatten)]
    pub document: DocumentArgs,
}

#[derive(Debug, Serialize)]
struct VariableRow<'a> {
    name: &'a str,
    definition: &'a str,
    value: f64,
}

#[derive(Debug, Serialize)]
struct VarsReport<'a> {
    dimensions: Vec3,
    variables: Vec<VariableRow<'a>>,
}

pub fn run_vars(args: &VarsArgs, json: bool, out: &mut dyn Write) -> Result<()> {
    let state = args.document.load_state()?;
    let data = state.data();
    let variables: Vec<VariableRow<'_>> = data
        .variables
        .iter()
        .map(|(name, definition)| VariableRow {
            name,
            definition,
            value: state.values().get(name).copied().unwrap_or_default(),
        })
        .collect();

    if json {
        return write_json(
            out,
            &VarsReport {
                dimensions: state.dimensions(),
                variables,
            },
        );
    }

    let width = variables.iter().map(|row| row.name.len()).max().unwrap_or(0);
    for row in &variables {
        if is_expression(row.definition) {
            writeln!(
                out,
                "{:<width$}  {}  = {}",
                row.name, row.value, row.definition
            )?;
        } else {
            writeln!(out, "{:<width$}  {}", row.name, row.value)?;
        }
    }
    writeln!(out, "dimensions {}", extent(state.dimensions()))?;
    Ok(())
}
