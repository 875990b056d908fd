#![forbid(unsafe_code)]

//! Structural errors raised while building or decoding the zone model.
//!
//! These are programming or document errors, not runtime degradation: an
//! unknown axis or an out-of-range `divElem` means a configuration table is
//! not exhaustive, so they surface as hard failures instead of defaults.

use std::fmt;

/// Error raised when a model value falls outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Axis index or letter is not one of `0/1/2` or `x/y/z`.
    InvalidAxis { value: String },
    /// `divElem` outside `0..=3`.
    InvalidDivElem { value: u8 },
    /// `divDir` is not `I`, `V`, or `H`.
    InvalidDivDir { value: String },
    /// `horDefType` is not `P`, `W`, or `D`.
    InvalidHorDefType { value: String },
    /// Comparison operator is not one of `= != > < >= <=`.
    InvalidOperator { value: String },
    /// Clickable side is not `FRONT`, `BACK`, `LEFT`, or `RIGHT`.
    InvalidZoneSide { value: String },
    /// A zone path with no segments, or with an empty segment.
    InvalidPath { value: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAxis { value } => {
                write!(f, "invalid splitting axis {value:?} (expected x, y, z or 0..=2)")
            }
            Self::InvalidDivElem { value } => {
                write!(f, "invalid divElem {value} (expected 0..=3)")
            }
            Self::InvalidDivDir { value } => {
                write!(f, "invalid divDir {value:?} (expected I, V or H)")
            }
            Self::InvalidHorDefType { value } => {
                write!(f, "invalid horDefType {value:?} (expected P, W or D)")
            }
            Self::InvalidOperator { value } => {
                write!(f, "invalid comparison operator {value:?}")
            }
            Self::InvalidZoneSide { value } => write!(f, "invalid zone side {value:?}"),
            Self::InvalidPath { value } => write!(f, "invalid zone path {value:?}"),
        }
    }
}

impl std::error::Error for ModelError {}
