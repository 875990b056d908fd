#![forbid(unsafe_code)]

//! `layout` and `locate`: geometry of a document's zones.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use zonage::{Vec3, ZonePath, ZonePlacement};

use crate::document::DocumentArgs;
use crate::error::{CliError, Result};
use crate::output::{extent, point, write_json};

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Only list zones at most this deep.
    #[arg(long)]
    pub max_level: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct LocateArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Zone identifier, e.g. `0.1.2`.
    pub id: ZonePath,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutReport {
    dimensions: Vec3,
    zones: Vec<ZonePlacement>,
}

pub fn run_layout(args: &LayoutArgs, json: bool, out: &mut dyn Write) -> Result<()> {
    let state = args.document.load_state()?;
    let zones: Vec<ZonePlacement> = state
        .layout_all()
        .into_iter()
        .filter(|p| args.max_level.is_none_or(|max| p.level <= max))
        .collect();
    tracing::debug!(zones = zones.len(), "layout computed");

    if json {
        return write_json(
            out,
            &LayoutReport {
                dimensions: state.dimensions(),
                zones,
            },
        );
    }

    writeln!(out, "dimensions {}", extent(state.dimensions()))?;
    for placement in &zones {
        let indent = "  ".repeat(placement.level);
        let marker = if placement.modifiable { " *" } else { "" };
        writeln!(
            out,
            "{indent}{id}{marker}  at {at}  size {size}",
            id = placement.id,
            at = point(placement.position),
            size = extent(placement.size),
        )?;
    }
    Ok(())
}

pub fn run_locate(args: &LocateArgs, json: bool, out: &mut dyn Write) -> Result<()> {
    let state = args.document.load_state()?;
    let location = state
        .locate(&args.id)
        .ok_or_else(|| CliError::ZoneNotFound {
            id: args.id.to_string(),
        })?;

    if json {
        return write_json(out, &location);
    }

    writeln!(out, "zone     {}", args.id)?;
    writeln!(out, "position {}", point(location.position))?;
    writeln!(out, "size     {}", extent(location.size))?;
    if let Some(side) = location.clickable_side {
        writeln!(out, "side     {side}")?;
    }
    Ok(())
}
