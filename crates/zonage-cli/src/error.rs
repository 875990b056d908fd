use std::path::PathBuf;

use thiserror::Error;
use zonage::DegradationAction;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read zoning document {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Zonage(#[from] zonage::Error),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("zone not found: {id}")]
    ZoneNotFound { id: String },

    #[error("document has {count} problem(s)")]
    Invalid { count: usize },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => 2,
            Self::Invalid { .. } => 3,
            Self::ZoneNotFound { .. } => 4,
            Self::Zonage(err) if err.degradation() == DegradationAction::NotFound => 4,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;

    #[test]
    fn invalid_argument_uses_usage_code() {
        let error = CliError::invalid("expected NAME=VALUE");
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "invalid argument: expected NAME=VALUE");
    }

    #[test]
    fn not_found_codes_agree() {
        let direct = CliError::ZoneNotFound { id: "0.9".into() };
        let wrapped = CliError::from(zonage::Error::UnknownVariable { name: "X".into() });
        assert_eq!(direct.exit_code(), 4);
        assert_eq!(wrapped.exit_code(), 4);
        assert_eq!(wrapped.to_string(), "unknown variable $X");
    }

    #[test]
    fn invalid_document_code() {
        let error = CliError::Invalid { count: 2 };
        assert_eq!(error.exit_code(), 3);
        assert!(error.to_string().contains('2'));
    }

    #[test]
    fn document_errors_map_to_generic_exit() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = CliError::Document {
            path: "plan.json".into(),
            source,
        };
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().starts_with("cannot read zoning document plan.json"));
    }

    #[test]
    fn io_errors_map_to_generic_exit() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = CliError::from(io);
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().contains("gone"));
    }
}
