#![forbid(unsafe_code)]

//! zonage error model and graceful degradation.
//!
//! Each layer owns a typed error. [`Error`] unifies them for callers of the
//! facade, and [`Error::degradation`] maps every variant to the recovery the
//! layout pipeline applies instead of failing: a bad expression measures 0,
//! an unusable branch disappears, overflowing fixed slots shrink.

use std::fmt;

use zonage_core::ModelError;
use zonage_expr::ExprError;
use zonage_layout::LayoutError;

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type of the zonage facade.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The document violates the model (unknown axis, bad `divElem`, ...).
    Model(ModelError),
    /// Arithmetic text could not be evaluated.
    Expr(ExprError),
    /// A layout step could not run.
    Layout(LayoutError),
    /// A state operation named a variable the document does not define.
    UnknownVariable { name: String },
}

/// Standard result type for zonage APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the layout pipeline does when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// The offending value measures 0.
    ZeroValue,
    /// The subtree gets no geometry.
    SkipBranch,
    /// Fixed slots are shrunk proportionally to fit.
    ScaleDown,
    /// Report "not found" to the caller; nothing is invented.
    NotFound,
    /// Unrecoverable; the document must be fixed.
    Abort,
}

impl Error {
    /// Determine the graceful degradation action for this error.
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Model(_) => DegradationAction::Abort,

            Self::Expr(_) => DegradationAction::ZeroValue,

            Self::Layout(LayoutError::DegenerateParent { .. }) => DegradationAction::SkipBranch,
            Self::Layout(LayoutError::NoPartitions) => DegradationAction::SkipBranch,
            Self::Layout(LayoutError::FixedOverflow { .. }) => DegradationAction::ScaleDown,
            Self::Layout(LayoutError::ZoneNotFound { .. }) => DegradationAction::NotFound,

            Self::UnknownVariable { .. } => DegradationAction::NotFound,
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Expr(_) => "expr",
            Self::Layout(_) => "layout",
            Self::UnknownVariable { .. } => "unknown_variable",
        }
    }

    /// Whether the pipeline can carry on past this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::Abort)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            Self::Expr(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
            Self::UnknownVariable { name } => write!(f, "unknown variable ${name}"),
        }
    }
}

impl fmt::Display for DegradationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroValue => write!(f, "zero_value"),
            Self::SkipBranch => write!(f, "skip_branch"),
            Self::ScaleDown => write!(f, "scale_down"),
            Self::NotFound => write!(f, "not_found"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Expr(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::UnknownVariable { .. } => None,
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

impl From<ExprError> for Error {
    fn from(err: ExprError) -> Self {
        Self::Expr(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
