#![forbid(unsafe_code)]

//! Dot-separated zone identifiers.
//!
//! A [`ZonePath`] such as `"0.2.1"` encodes a zone's position in the tree and
//! doubles as its identity. Ancestry is decided on whole segments, so `"0.1"`
//! is an ancestor of `"0.1.4"` but not of `"0.10"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identifier of the root zone.
pub const ROOT_ID: &str = "0";

/// Opaque dot-path identifier of a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZonePath(String);

impl ZonePath {
    /// Wrap a path without validation.
    ///
    /// Documents are trusted input; use [`str::parse`] to reject malformed
    /// paths coming from users.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The root identifier `"0"`.
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_ID.to_owned())
    }

    /// The raw dot-separated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterator over the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split('.')
    }

    /// Number of segments (the root has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Whether this is the root identifier.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// The enclosing path, or `None` for a single-segment path.
    #[must_use]
    pub fn parent(&self) -> Option<ZonePath> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| ZonePath(parent.to_owned()))
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = ZonePath> + '_ {
        std::iter::successors(self.parent(), ZonePath::parent)
    }

    /// Path of the `index`-th child.
    #[must_use]
    pub fn child(&self, index: usize) -> ZonePath {
        ZonePath(format!("{}.{index}", self.0))
    }

    /// Whether `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &ZonePath) -> bool {
        let mut mine = self.segments();
        let mut theirs = other.segments();
        loop {
            match (mine.next(), theirs.next()) {
                (None, Some(_)) => return true,
                (Some(a), Some(b)) if a == b => continue,
                _ => return false,
            }
        }
    }

    /// Whether `self` is a strict descendant of `other`.
    #[must_use]
    pub fn is_descendant_of(&self, other: &ZonePath) -> bool {
        other.is_ancestor_of(self)
    }
}

impl FromStr for ZonePath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.split('.').any(str::is_empty) {
            return Err(ModelError::InvalidPath {
                value: s.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl fmt::Display for ZonePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZonePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ZonePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
