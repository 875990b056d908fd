#![forbid(unsafe_code)]

//! Layout primitives and the recursive zone walk.
//!
//! A parent box is tiled along one axis into contiguous child boxes whose
//! extents come from the parent's division rule. [`walk::ZoneWalker`] applies
//! that step recursively over a zone tree.

pub mod direction;
pub mod division;
pub mod sizes;
pub mod walk;

use std::fmt;

use serde::Serialize;
use zonage_core::{Axis, Box3, DivDir, DivElem, HorDefType, Vec3, ZonePath};

pub use direction::{DirectionConfig, Increment, direction_config};
pub use division::{
    FIXED_SLOT, MAX_REPETITION, ParsedDivision, ResolvedRule, Slot,
    parse_division_rule_with_variables, parse_division_string, resolve_rule,
    validate_division_rule, validate_division_string,
};
pub use sizes::{
    SizeCalculation, calculate_child_sizes, calculate_child_sizes_detailed,
    calculate_child_sizes_from_string, calculate_sizes_from_parsed_division,
    try_calculate_child_sizes,
};
pub use walk::{ZoneLocation, ZonePlacement, ZoneWalker};

/// Slack allowed by [`validate_layouts_within_parent`].
pub const LAYOUT_TOLERANCE: f64 = 1e-6;

/// Why a layout step could not run.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The parent has no usable extent along the splitting axis.
    DegenerateParent { axis: Axis, extent: f64 },
    /// Size computation produced no partitions.
    NoPartitions,
    /// Fixed slots need more room than the parent has.
    FixedOverflow { total_fixed: f64, parent_size: f64 },
    /// No zone with this id is reachable by the walk.
    ZoneNotFound { id: ZonePath },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateParent { axis, extent } => {
                write!(f, "parent extent along {axis} is {extent}, cannot split")
            }
            Self::NoPartitions => write!(f, "division produced no partitions"),
            Self::FixedOverflow {
                total_fixed,
                parent_size,
            } => write!(
                f,
                "fixed sizes total {total_fixed} but parent is only {parent_size}"
            ),
            Self::ZoneNotFound { id } => write!(f, "zone {id} not found"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Absolute placement of one child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChildLayout {
    /// Centre of the child box.
    pub position: Vec3,
    pub size: Vec3,
}

impl From<ChildLayout> for Box3 {
    fn from(layout: ChildLayout) -> Self {
        Box3::new(layout.position, layout.size)
    }
}

impl From<Box3> for ChildLayout {
    fn from(b: Box3) -> Self {
        Self {
            position: b.position,
            size: b.size,
        }
    }
}

/// Child layouts together with the configuration that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCalculation {
    pub layouts: Vec<ChildLayout>,
    pub total_children: usize,
    pub direction: DirectionConfig,
}

fn place(parent: &Box3, axis: Axis, center: f64, child_size: f64) -> ChildLayout {
    let extent = parent.size.get(axis);
    ChildLayout {
        position: parent
            .position
            .with(axis, parent.position.get(axis) + center * extent),
        size: parent.size.with(axis, child_size),
    }
}

/// Tile `parent` along `config.splitting_axis` with `child_sizes`.
///
/// Each child keeps the parent's other two coordinates and extents.
/// Children are contiguous, starting at `config.start_position` and
/// advancing in `config.increment` direction.
pub fn calculate_layouts_from_config(
    parent: &Box3,
    child_sizes: &[f64],
    config: &DirectionConfig,
) -> Vec<ChildLayout> {
    let axis = config.splitting_axis;
    let extent = parent.size.get(axis);
    let sign = config.increment.sign();
    let mut offset = config.start_position;

    child_sizes
        .iter()
        .map(|&child_size| {
            let normalized = child_size / extent;
            let center = offset + normalized / 2.0 * sign;
            offset += normalized * sign;
            place(parent, axis, center, child_size)
        })
        .collect()
}

/// [`calculate_layouts_from_config`] with its configuration attached.
pub fn calculate_child_layouts(
    parent: &Box3,
    child_sizes: &[f64],
    config: &DirectionConfig,
) -> LayoutCalculation {
    LayoutCalculation {
        layouts: calculate_layouts_from_config(parent, child_sizes, config),
        total_children: child_sizes.len(),
        direction: *config,
    }
}

/// [`calculate_child_layouts`] refusing inputs that cannot be tiled.
pub fn try_calculate_child_layouts(
    parent: &Box3,
    child_sizes: &[f64],
    config: &DirectionConfig,
) -> Result<LayoutCalculation, LayoutError> {
    if child_sizes.is_empty() {
        return Err(LayoutError::NoPartitions);
    }
    let axis = config.splitting_axis;
    let extent = parent.size.get(axis);
    if !(extent.is_finite() && extent > 0.0) {
        return Err(LayoutError::DegenerateParent { axis, extent });
    }
    Ok(calculate_child_layouts(parent, child_sizes, config))
}

/// `count` copies of the parent box.
pub fn calculate_inner_partition_layouts(parent: &Box3, count: usize) -> Vec<ChildLayout> {
    vec![ChildLayout::from(*parent); count]
}

/// Layout of the child at `index` alone, or `None` when out of range.
pub fn calculate_child_layout_at_index(
    parent: &Box3,
    child_sizes: &[f64],
    config: &DirectionConfig,
    index: usize,
) -> Option<ChildLayout> {
    let child_size = *child_sizes.get(index)?;
    let axis = config.splitting_axis;
    let extent = parent.size.get(axis);
    let sign = config.increment.sign();
    let before: f64 = child_sizes[..index].iter().map(|s| s / extent).sum();
    let offset = config.start_position + before * sign;
    let center = offset + child_size / extent / 2.0 * sign;
    Some(place(parent, axis, center, child_size))
}

/// Smallest box containing every layout, `None` for no layouts.
pub fn calculate_layout_bounds(layouts: &[ChildLayout]) -> Option<Box3> {
    layouts
        .iter()
        .map(|&l| Box3::from(l))
        .reduce(|acc, b| acc.union(&b))
}

/// Whether every layout lies inside `parent`, within [`LAYOUT_TOLERANCE`].
pub fn validate_layouts_within_parent(layouts: &[ChildLayout], parent: &Box3) -> bool {
    calculate_layout_bounds(layouts)
        .is_none_or(|bounds| parent.contains_box(&bounds, LAYOUT_TOLERANCE))
}

/// Direction lookup and layout in one call.
pub fn quick_layout(
    parent: &Box3,
    child_sizes: &[f64],
    div_dir: DivDir,
    hor_def_type: HorDefType,
    div_elem: DivElem,
) -> LayoutCalculation {
    let config = direction_config(div_dir, hor_def_type, div_elem);
    calculate_child_layouts(parent, child_sizes, &config)
}
