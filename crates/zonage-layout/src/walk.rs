#![forbid(unsafe_code)]

//! Recursive zone walk.
//!
//! Every zone is handed the box its parent's layout step produced; the root
//! receives the document's overall bounds. The walk is pre-order and
//! depth-first. It keeps no state between calls, so a changed variable map
//! just means walking again.
//!
//! Branching per zone:
//!
//! - **empty**: pass-through container. Children receive the same box.
//! - **inner**: the first `partition_count` children each receive the same
//!   box (layered partitions).
//! - **vertical / horizontal**: the rule's sizes tile the box along one
//!   axis; children and tiles are zipped to the shorter of the two.
//!
//! [`ZoneWalker::layout_all`] and [`ZoneWalker::locate`] share one traversal
//! so they always agree on which branches exist.

use std::ops::ControlFlow;

use serde::Serialize;
use tracing::{debug, warn};
use zonage_core::{Box3, DivDir, Vec3, Zone, ZonePath, ZoneSide};
use zonage_expr::VariableMap;

use crate::direction::direction_config;
use crate::division::resolve_rule;
use crate::sizes::calculate_sizes_from_parsed_division;
use crate::{LayoutError, try_calculate_child_layouts};

/// Geometry of one rendered zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePlacement {
    pub id: ZonePath,
    pub position: Vec3,
    pub size: Vec3,
    /// Recursion depth; the root is 0.
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickable: Option<ZoneSide>,
    pub modifiable: bool,
}

impl ZonePlacement {
    /// The placement as a box.
    #[must_use]
    pub fn bounds(&self) -> Box3 {
        Box3::new(self.position, self.size)
    }
}

/// Answer to [`ZoneWalker::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLocation {
    pub position: Vec3,
    pub size: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickable_side: Option<ZoneSide>,
}

/// Walks a zone tree against one variable map.
#[derive(Debug, Clone, Copy)]
pub struct ZoneWalker<'a> {
    root: &'a Zone,
    bounds: Box3,
    variables: &'a VariableMap,
}

impl<'a> ZoneWalker<'a> {
    /// Walker over `root` placed in `bounds`.
    pub fn new(root: &'a Zone, bounds: Box3, variables: &'a VariableMap) -> Self {
        Self {
            root,
            bounds,
            variables,
        }
    }

    /// Root zone.
    pub fn root(&self) -> &'a Zone {
        self.root
    }

    /// Overall bounds handed to the root.
    pub fn bounds(&self) -> Box3 {
        self.bounds
    }

    /// Every non-empty reachable zone with its geometry, in pre-order.
    pub fn layout_all(&self) -> Vec<ZonePlacement> {
        let mut placements = Vec::new();
        let _ = self.walk(self.root, self.bounds, 0, &mut |zone, bounds, level| {
            if !zone.empty {
                placements.push(ZonePlacement {
                    id: zone.index.clone(),
                    position: bounds.position,
                    size: bounds.size,
                    level,
                    clickable: zone.clickable,
                    modifiable: zone.modifiable,
                });
            }
            ControlFlow::<()>::Continue(())
        });
        placements
    }

    /// Geometry of zone `id`, or `None` when no reachable zone has that id.
    ///
    /// Empty zones are located too; they report the box they pass through.
    pub fn locate(&self, id: &ZonePath) -> Option<ZoneLocation> {
        let found = self.walk(self.root, self.bounds, 0, &mut |zone, bounds, _| {
            if &zone.index == id {
                return ControlFlow::Break(ZoneLocation {
                    position: bounds.position,
                    size: bounds.size,
                    clickable_side: zone.clickable,
                });
            }
            ControlFlow::Continue(())
        });
        match found {
            ControlFlow::Break(location) => Some(location),
            ControlFlow::Continue(()) => None,
        }
    }

    /// [`locate`](Self::locate) reporting a miss as an error.
    pub fn try_locate(&self, id: &ZonePath) -> Result<ZoneLocation, LayoutError> {
        self.locate(id)
            .ok_or_else(|| LayoutError::ZoneNotFound { id: id.clone() })
    }

    fn walk<B>(
        &self,
        zone: &Zone,
        bounds: Box3,
        level: usize,
        visit: &mut impl FnMut(&Zone, &Box3, usize) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let _span = tracing::debug_span!("zone.walk", zone = %zone.index, level).entered();

        visit(zone, &bounds, level)?;
        if zone.is_leaf() {
            return ControlFlow::Continue(());
        }

        if zone.empty {
            debug!(target: "zonage.walk", zone = %zone.index, "pass-through container");
            for child in &zone.children {
                self.walk(child, bounds, level + 1, visit)?;
            }
            return ControlFlow::Continue(());
        }

        let resolved = resolve_rule(&zone.lin_div, self.variables);
        debug!(
            target: "zonage.walk",
            zone = %zone.index,
            div_dir = %zone.div_dir,
            division = %resolved.division_string,
            "resolved division"
        );

        let boxes: Vec<Box3> = match zone.div_dir {
            DivDir::Inner => {
                vec![bounds; resolved.parsed.partition_count()]
            }
            DivDir::Vertical | DivDir::Horizontal => {
                let config = direction_config(zone.div_dir, zone.hor_def_type, zone.div_elem);
                let extent = bounds.size.get(config.splitting_axis);
                let sizes = calculate_sizes_from_parsed_division(
                    extent,
                    &resolved.parsed.ratios,
                    &resolved.parsed.fixed_sizes,
                );
                match try_calculate_child_layouts(&bounds, &sizes, &config) {
                    Ok(calc) => calc.layouts.into_iter().map(Box3::from).collect(),
                    Err(err) => {
                        warn!(zone = %zone.index, error = %err, "layout failed, skipping branch");
                        return ControlFlow::Continue(());
                    }
                }
            }
        };

        if boxes.len() < zone.children.len() {
            warn!(
                zone = %zone.index,
                declared = zone.children.len(),
                partitions = boxes.len(),
                "more children than partitions, extra children ignored"
            );
        }

        for (child, child_bounds) in zone.children.iter().zip(boxes) {
            self.walk(child, child_bounds, level + 1, visit)?;
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonage_core::{DivElem, HorDefType};

    fn vars() -> VariableMap {
        VariableMap::new()
    }

    fn root_box() -> Box3 {
        Box3::from_size(Vec3::new(3000.0, 2000.0, 600.0))
    }

    fn ids(placements: &[ZonePlacement]) -> Vec<&str> {
        placements.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn leaf_root_is_whole_box() {
        let root = Zone::new("0", DivDir::Vertical);
        let vars = vars();
        let walker = ZoneWalker::new(&root, root_box(), &vars);
        let all = walker.layout_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].bounds(), root_box());
        assert_eq!(all[0].level, 0);
    }

    #[test]
    fn vertical_split_is_pre_order() {
        let root = Zone::new("0", DivDir::Vertical).rule("1:1").children([
            Zone::new("0.0", DivDir::Horizontal).rule("1:1").children([
                Zone::new("0.0.0", DivDir::Vertical),
                Zone::new("0.0.1", DivDir::Vertical),
            ]),
            Zone::new("0.1", DivDir::Vertical),
        ]);
        let vars = vars();
        let all = ZoneWalker::new(&root, root_box(), &vars).layout_all();
        assert_eq!(ids(&all), vec!["0", "0.0", "0.0.0", "0.0.1", "0.1"]);
        assert_eq!(all[1].size, Vec3::new(3000.0, 1000.0, 600.0));
        assert_eq!(all[1].position, Vec3::new(0.0, -500.0, 0.0));
        assert_eq!(all[2].size, Vec3::new(1500.0, 1000.0, 600.0));
        assert_eq!(all[2].position, Vec3::new(-750.0, -500.0, 0.0));
        assert_eq!(all[2].level, 2);
    }

    #[test]
    fn inner_zone_layers_first_partitions() {
        let root = Zone::new("0", DivDir::Inner).rule("2*{1}").children([
            Zone::new("0.0", DivDir::Vertical),
            Zone::new("0.1", DivDir::Vertical),
            Zone::new("0.2", DivDir::Vertical),
        ]);
        let vars = vars();
        let all = ZoneWalker::new(&root, root_box(), &vars).layout_all();
        assert_eq!(ids(&all), vec!["0", "0.0", "0.1"]);
        assert!(all.iter().all(|p| p.bounds() == root_box()));
    }

    #[test]
    fn empty_zones_pass_through() {
        let root = Zone::new("0", DivDir::Vertical).empty(true).children([
            Zone::new("0.0", DivDir::Vertical).empty(true),
            Zone::new("0.1", DivDir::Horizontal),
        ]);
        let vars = vars();
        let walker = ZoneWalker::new(&root, root_box(), &vars);
        let all = walker.layout_all();
        assert_eq!(ids(&all), vec!["0.1"]);
        assert_eq!(all[0].bounds(), root_box());

        let hidden = walker.locate(&ZonePath::new("0.0")).unwrap();
        assert_eq!(hidden.size, root_box().size);
    }

    #[test]
    fn width_auto_children_left_to_right() {
        let root = Zone::new("0", DivDir::Horizontal)
            .rule("1:2")
            .horizontal(HorDefType::WidthAuto, DivElem::default())
            .children([
                Zone::new("0.0", DivDir::Vertical),
                Zone::new("0.1", DivDir::Vertical),
            ]);
        let vars = vars();
        let walker = ZoneWalker::new(&root, root_box(), &vars);
        let left = walker.locate(&ZonePath::new("0.0")).unwrap();
        let right = walker.locate(&ZonePath::new("0.1")).unwrap();
        assert_eq!(left.size.x, 1000.0);
        assert_eq!(right.size.x, 2000.0);
        assert!((left.position.x - left.size.x / 2.0 + 1500.0).abs() < 1e-9);
        assert!(left.position.x < right.position.x);
    }

    #[test]
    #[tracing_test::traced_test]
    fn extra_children_are_ignored() {
        let root = Zone::new("0", DivDir::Vertical).rule("1").children([
            Zone::new("0.0", DivDir::Vertical),
            Zone::new("0.1", DivDir::Vertical),
        ]);
        let vars = vars();
        let walker = ZoneWalker::new(&root, root_box(), &vars);
        assert_eq!(ids(&walker.layout_all()), vec!["0", "0.0"]);
        assert!(walker.locate(&ZonePath::new("0.1")).is_none());
        assert!(logs_contain("extra children ignored"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn degenerate_branch_is_skipped() {
        let flat = Box3::from_size(Vec3::new(1000.0, 0.0, 1000.0));
        let root = Zone::new("0", DivDir::Vertical)
            .rule("1:1")
            .children([Zone::new("0.0", DivDir::Vertical)]);
        let vars = vars();
        let walker = ZoneWalker::new(&root, flat, &vars);
        assert_eq!(ids(&walker.layout_all()), vec!["0"]);
        assert!(logs_contain("skipping branch"));
    }

    #[test]
    fn conditional_rule_follows_variables() {
        use zonage_core::{Comparison, ComparisonOperator, Condition, ConditionOperation, LinDiv};

        let rule = LinDiv::new("1").condition(Condition::new(
            "1:1",
            ConditionOperation::All,
            vec![Comparison::new("$SPLIT", ComparisonOperator::Eq, "1")],
        ));
        let root = Zone::new("0", DivDir::Vertical).lin_div(rule).children([
            Zone::new("0.0", DivDir::Vertical),
            Zone::new("0.1", DivDir::Vertical),
        ]);

        let off = vars();
        assert_eq!(ZoneWalker::new(&root, root_box(), &off).layout_all().len(), 2);

        let on: VariableMap = [("SPLIT".to_owned(), 1.0)].into_iter().collect();
        assert_eq!(ZoneWalker::new(&root, root_box(), &on).layout_all().len(), 3);
    }

    #[test]
    fn locate_agrees_with_layout_all() {
        let root = Zone::new("0", DivDir::Horizontal)
            .rule("300mm:1:2")
            .horizontal(HorDefType::Plain, DivElem::new(2).unwrap())
            .clickable(ZoneSide::Front)
            .children([
                Zone::new("0.0", DivDir::Vertical),
                Zone::new("0.1", DivDir::Vertical).rule("1:1").children([
                    Zone::new("0.1.0", DivDir::Vertical).clickable(ZoneSide::Left),
                    Zone::new("0.1.1", DivDir::Vertical),
                ]),
                Zone::new("0.2", DivDir::Vertical),
            ]);
        let vars = vars();
        let walker = ZoneWalker::new(&root, root_box(), &vars);
        for placement in walker.layout_all() {
            let location = walker.try_locate(&placement.id).unwrap();
            assert_eq!(location.position, placement.position);
            assert_eq!(location.size, placement.size);
            assert_eq!(location.clickable_side, placement.clickable);
        }
        assert_eq!(
            walker.try_locate(&ZonePath::new("0.9")),
            Err(LayoutError::ZoneNotFound {
                id: ZonePath::new("0.9")
            })
        );
    }
}
