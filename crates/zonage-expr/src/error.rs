#![forbid(unsafe_code)]

//! Errors of the arithmetic micro-language.

use std::fmt;

/// Why a piece of arithmetic text could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    /// Nothing left to evaluate after sanitizing.
    Empty,
    /// A numeric literal that does not parse (e.g. `1.2.3`).
    InvalidNumber { literal: String },
    /// Operator or parenthesis in a position where an operand was expected.
    UnexpectedToken { token: String, offset: usize },
    /// Input ended in the middle of an expression.
    UnexpectedEnd,
    /// A complete expression was followed by more tokens.
    TrailingInput { offset: usize },
    /// Evaluation produced infinity or NaN (e.g. division by zero).
    NonFinite { value: f64 },
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty expression"),
            Self::InvalidNumber { literal } => write!(f, "invalid number literal {literal:?}"),
            Self::UnexpectedToken { token, offset } => {
                write!(f, "unexpected {token:?} at offset {offset}")
            }
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::TrailingInput { offset } => {
                write!(f, "unexpected trailing input at offset {offset}")
            }
            Self::NonFinite { value } => write!(f, "non-finite result {value}"),
        }
    }
}

impl std::error::Error for ExprError {}
