#![forbid(unsafe_code)]

//! Splitting axis and ordering of a zone's partitions.
//!
//! Positions along the splitting axis are normalized to the parent extent:
//! `-0.5` is the parent's low face on that axis and `+0.5` its high face.
//! Partition 0 starts at `start_position` and later partitions extend in
//! the `increment` direction.

use serde::Serialize;
use zonage_core::{Axis, DivDir, DivElem, HorDefType};

/// Which way successive partitions extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Increment {
    /// Toward `+0.5`.
    Forward,
    /// Toward `-0.5`.
    Backward,
}

impl Increment {
    /// `+1.0` or `-1.0`.
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Fully resolved axis configuration of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionConfig {
    pub is_vertical: bool,
    pub is_horizontal: bool,
    pub is_width_splitting: bool,
    pub is_depth_splitting: bool,
    /// Normalized coordinate where partition 0 begins.
    pub start_position: f64,
    pub increment: Increment,
    pub splitting_axis: Axis,
}

impl DirectionConfig {
    /// Configuration of an inner (layered) zone. Its axis fields are never
    /// used for placement.
    pub const INNER: DirectionConfig = DirectionConfig {
        is_vertical: false,
        is_horizontal: false,
        is_width_splitting: false,
        is_depth_splitting: false,
        start_position: 0.0,
        increment: Increment::Forward,
        splitting_axis: Axis::Y,
    };

    /// Bottom to top.
    pub const VERTICAL: DirectionConfig = DirectionConfig {
        is_vertical: true,
        is_horizontal: false,
        is_width_splitting: false,
        is_depth_splitting: false,
        start_position: -0.5,
        increment: Increment::Forward,
        splitting_axis: Axis::Y,
    };

    const fn width(start_position: f64, increment: Increment) -> Self {
        Self {
            is_vertical: false,
            is_horizontal: true,
            is_width_splitting: true,
            is_depth_splitting: false,
            start_position,
            increment,
            splitting_axis: Axis::X,
        }
    }

    const fn depth(start_position: f64, increment: Increment) -> Self {
        Self {
            is_vertical: false,
            is_horizontal: true,
            is_width_splitting: false,
            is_depth_splitting: true,
            start_position,
            increment,
            splitting_axis: Axis::Z,
        }
    }

    /// Index of the parent size component being split.
    #[inline]
    pub const fn child_size_index(&self) -> usize {
        self.splitting_axis.index()
    }
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            is_vertical: false,
            ..Self::VERTICAL
        }
    }
}

/// Whether a horizontal zone splits along depth rather than width.
fn splits_depth(hor_def_type: HorDefType, div_elem: DivElem) -> bool {
    match hor_def_type {
        HorDefType::Plain => matches!(div_elem.get(), 1 | 3),
        HorDefType::DepthAuto => true,
        HorDefType::WidthAuto => false,
    }
}

/// Direction configuration for a zone's split parameters.
pub fn direction_config(
    div_dir: DivDir,
    hor_def_type: HorDefType,
    div_elem: DivElem,
) -> DirectionConfig {
    use Increment::{Backward, Forward};

    match div_dir {
        DivDir::Inner => DirectionConfig::INNER,
        DivDir::Vertical => DirectionConfig::VERTICAL,
        DivDir::Horizontal if splits_depth(hor_def_type, div_elem) => {
            match (hor_def_type, div_elem.get()) {
                // front to back
                (HorDefType::Plain, 3) => DirectionConfig::depth(-0.5, Forward),
                _ => DirectionConfig::depth(0.5, Backward),
            }
        }
        DivDir::Horizontal => match (hor_def_type, div_elem.get()) {
            // right to left
            (HorDefType::Plain, 2) => DirectionConfig::width(0.5, Backward),
            _ => DirectionConfig::width(-0.5, Forward),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(v: u8) -> DivElem {
        DivElem::new(v).unwrap()
    }

    #[test]
    fn vertical_builds_upward() {
        let cfg = direction_config(DivDir::Vertical, HorDefType::Plain, elem(0));
        assert_eq!(cfg.splitting_axis, Axis::Y);
        assert_eq!(cfg.child_size_index(), 1);
        assert_eq!(cfg.start_position, -0.5);
        assert_eq!(cfg.increment, Increment::Forward);
        assert!(cfg.is_vertical);
    }

    #[test]
    fn plain_horizontal_table() {
        let cases = [
            (0, Axis::X, -0.5, Increment::Forward),
            (1, Axis::Z, 0.5, Increment::Backward),
            (2, Axis::X, 0.5, Increment::Backward),
            (3, Axis::Z, -0.5, Increment::Forward),
        ];
        for (e, axis, start, inc) in cases {
            let cfg = direction_config(DivDir::Horizontal, HorDefType::Plain, elem(e));
            assert_eq!(cfg.splitting_axis, axis, "divElem {e}");
            assert_eq!(cfg.start_position, start, "divElem {e}");
            assert_eq!(cfg.increment, inc, "divElem {e}");
            assert!(cfg.is_horizontal);
            assert_eq!(cfg.is_depth_splitting, axis == Axis::Z);
            assert_eq!(cfg.is_width_splitting, axis == Axis::X);
        }
    }

    #[test]
    fn auto_types_ignore_div_elem() {
        for e in 0..=3 {
            let w = direction_config(DivDir::Horizontal, HorDefType::WidthAuto, elem(e));
            assert_eq!((w.splitting_axis, w.start_position), (Axis::X, -0.5));
            assert_eq!(w.increment, Increment::Forward);

            let d = direction_config(DivDir::Horizontal, HorDefType::DepthAuto, elem(e));
            assert_eq!((d.splitting_axis, d.start_position), (Axis::Z, 0.5));
            assert_eq!(d.increment, Increment::Backward);
        }
    }

    #[test]
    fn inner_and_default_are_inert() {
        let inner = direction_config(DivDir::Inner, HorDefType::Plain, elem(2));
        assert_eq!(inner, DirectionConfig::INNER);
        assert!(!inner.is_horizontal && !inner.is_vertical);

        let fallback = DirectionConfig::default();
        assert_eq!(fallback.splitting_axis, Axis::Y);
        assert_eq!(fallback.start_position, -0.5);
        assert!(!fallback.is_vertical);
    }
}
