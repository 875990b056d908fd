#![forbid(unsafe_code)]

//! Loading a zoning document and applying command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use zonage::{ZoningData, ZoningState};

use crate::error::{CliError, Result};

/// Document selection shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct DocumentArgs {
    /// Zoning document (JSON).
    pub document: PathBuf,

    /// Override a variable before evaluating, e.g. `--set ZB_W=4500`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
}

impl DocumentArgs {
    #[must_use]
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            set: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_override(mut self, assignment: impl Into<String>) -> Self {
        self.set.push(assignment.into());
        self
    }

    /// Load the document, resolve it, and apply every override in order.
    pub fn load_state(&self) -> Result<ZoningState> {
        let data = load_document(&self.document)?;
        let mut state = ZoningState::new(data);
        for assignment in &self.set {
            let (name, value) = parse_assignment(assignment)?;
            state = state.update_value(&name, value)?;
        }
        tracing::debug!(
            document = %self.document.display(),
            overrides = self.set.len(),
            "document loaded"
        );
        Ok(state)
    }
}

pub fn load_document(path: &Path) -> Result<ZoningData> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Document {
        path: path.to_path_buf(),
        source,
    })
}

/// Split `NAME=VALUE`. A leading `$` on the name is accepted.
pub fn parse_assignment(text: &str) -> Result<(String, f64)> {
    let Some((name, value)) = text.split_once('=') else {
        return Err(CliError::invalid(format!(
            "expected NAME=VALUE, got `{text}`"
        )));
    };
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        return Err(CliError::invalid(format!("missing variable name in `{text}`")));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::invalid(format!("`{}` is not a number", value.trim())))?;
    Ok((name.to_owned(), value))
}
