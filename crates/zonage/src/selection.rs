#![forbid(unsafe_code)]

//! Which zones the user may click.
//!
//! Selecting a zone opens its subtree: the selected zone's children, and
//! the siblings along the path to the selection, become clickable. A
//! modifiable zone that is not on that path keeps its children locked, and
//! every strict ancestor of the selection is locked too.

use serde::{Deserialize, Serialize};
use zonage_core::{Zone, ZonePath, ZoneSide};

/// The current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedZone {
    pub id: ZonePath,
    pub side: ZoneSide,
}

impl SelectedZone {
    pub fn new(id: impl Into<ZonePath>, side: ZoneSide) -> Self {
        Self {
            id: id.into(),
            side,
        }
    }

    /// The root, seen from the front.
    pub fn root() -> Self {
        Self::new(ZonePath::root(), ZoneSide::Front)
    }
}

/// Interaction state of one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInteraction {
    pub id: ZonePath,
    pub selected: bool,
    pub disabled: bool,
    pub interactive: bool,
}

/// Whether a child of `parent` starts disabled.
fn child_disabled(parent: &Zone, parent_disabled: bool, selected: Option<&ZonePath>) -> bool {
    if !parent.modifiable && !parent_disabled {
        return false;
    }
    match selected {
        Some(id) if *id == parent.index => false,
        Some(id) if parent.index.is_ancestor_of(id) => false,
        _ => true,
    }
}

fn annotate_into(
    zone: &Zone,
    inherited: bool,
    selected: Option<&ZonePath>,
    out: &mut Vec<ZoneInteraction>,
) {
    let is_selected = selected == Some(&zone.index);
    let above_selection = selected.is_some_and(|id| zone.index.is_ancestor_of(id));
    let disabled = inherited || above_selection;
    out.push(ZoneInteraction {
        id: zone.index.clone(),
        selected: is_selected,
        disabled,
        interactive: zone.modifiable && !disabled && !is_selected,
    });
    let for_children = child_disabled(zone, inherited, selected);
    for child in &zone.children {
        annotate_into(child, for_children, selected, out);
    }
}

/// Interaction state of every zone, in pre-order.
pub fn annotate(root: &Zone, selected: Option<&ZonePath>) -> Vec<ZoneInteraction> {
    let mut out = Vec::new();
    annotate_into(root, false, selected, &mut out);
    out
}

/// Nearest strict ancestor of `id` that is modifiable, or the root.
pub fn find_closest_modifiable_parent(root: &Zone, id: &ZonePath) -> ZonePath {
    id.ancestors()
        .find(|ancestor| root.find(ancestor).is_some_and(|zone| zone.modifiable))
        .unwrap_or_else(ZonePath::root)
}

/// Whether zone `id` exists and is modifiable.
pub fn is_zone_modifiable(root: &Zone, id: &ZonePath) -> bool {
    root.find(id).is_some_and(|zone| zone.modifiable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonage_core::DivDir;

    fn state<'a>(all: &'a [ZoneInteraction], id: &str) -> &'a ZoneInteraction {
        all.iter().find(|z| z.id.as_str() == id).unwrap()
    }

    /// Root with a modifiable cabinet `0.0` holding two modifiable shelves.
    fn tree() -> Zone {
        Zone::new("0", DivDir::Horizontal).children([
            Zone::new("0.0", DivDir::Vertical).modifiable(true).children([
                Zone::new("0.0.0", DivDir::Vertical).modifiable(true),
                Zone::new("0.0.1", DivDir::Vertical).modifiable(true),
            ]),
            Zone::new("0.1", DivDir::Vertical).modifiable(true),
        ])
    }

    #[test]
    fn root_selected_opens_top_level() {
        let root = tree();
        let all = annotate(&root, Some(&ZonePath::root()));
        assert!(state(&all, "0").selected);
        assert!(state(&all, "0.0").interactive);
        assert!(state(&all, "0.1").interactive);
        assert!(state(&all, "0.0.0").disabled);
        assert!(!state(&all, "0.0.0").interactive);
    }

    #[test]
    fn selecting_a_child_opens_its_subtree_and_locks_ancestors() {
        let root = tree();
        let all = annotate(&root, Some(&ZonePath::new("0.0")));
        let cabinet = state(&all, "0.0");
        assert!(cabinet.selected && !cabinet.interactive);
        assert!(state(&all, "0").disabled);
        assert!(state(&all, "0.0.0").interactive);
        assert!(state(&all, "0.0.1").interactive);
        assert!(state(&all, "0.1").interactive);
    }

    #[test]
    fn siblings_of_a_deep_selection_stay_open() {
        let root = tree();
        let all = annotate(&root, Some(&ZonePath::new("0.0.1")));
        assert!(state(&all, "0.0.0").interactive);
        assert!(state(&all, "0.0").disabled);
        assert!(!state(&all, "0.0.1").interactive);
    }

    #[test]
    fn nothing_selected_locks_below_modifiable() {
        let root = tree();
        let all = annotate(&root, None);
        assert!(state(&all, "0.0").interactive);
        assert!(state(&all, "0.0.0").disabled);
        assert!(!all.iter().any(|z| z.selected));
    }

    #[test]
    fn closest_modifiable_parent() {
        let root = tree();
        assert_eq!(
            find_closest_modifiable_parent(&root, &ZonePath::new("0.0.1")),
            ZonePath::new("0.0")
        );
        assert_eq!(
            find_closest_modifiable_parent(&root, &ZonePath::new("0.1")),
            ZonePath::root()
        );
        assert!(is_zone_modifiable(&root, &ZonePath::new("0.1")));
        assert!(!is_zone_modifiable(&root, &ZonePath::root()));
        assert!(!is_zone_modifiable(&root, &ZonePath::new("0.7")));
    }
}
