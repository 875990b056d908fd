use std::io::{self, Write};

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::layout::{LayoutArgs, LocateArgs, run_layout, run_locate};
use crate::logging;
use crate::rule::{RuleArgs, run_rule};
use crate::validate::{ValidateArgs, run_validate};
use crate::vars::{VarsArgs, run_vars};

#[derive(Debug, Parser)]
#[command(
    name = "zonage",
    about = "Lay out, inspect, and validate parametric zoning documents",
    version
)]
pub struct Cli {
    /// Log layout decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Position and size of every rendered zone.
    Layout(LayoutArgs),

    /// Position and size of one zone.
    Locate(LocateArgs),

    /// Resolved variables and overall dimensions.
    Vars(VarsArgs),

    /// How one zone's division rule resolves and splits.
    Rule(RuleArgs),

    /// Check every rule, condition, and variable reference.
    Validate(ValidateArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Dispatch `cli`, writing the command's output to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let _span = tracing::debug_span!("command", json = cli.json).entered();
    match &cli.command {
        Commands::Layout(args) => run_layout(args, cli.json, out),
        Commands::Locate(args) => run_locate(args, cli.json, out),
        Commands::Vars(args) => run_vars(args, cli.json, out),
        Commands::Rule(args) => run_rule(args, cli.json, out),
        Commands::Validate(args) => run_validate(args, cli.json, out),
    }
}
