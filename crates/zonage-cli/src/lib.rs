#![forbid(unsafe_code)]

//! Command-line front end for zoning documents.

pub mod cli;
pub mod document;
pub mod error;
pub mod layout;
pub mod logging;
pub mod output;
pub mod rule;
pub mod validate;
pub mod vars;

pub use cli::{Cli, Commands, execute, run, run_from_env};
pub use error::{CliError, Result};
