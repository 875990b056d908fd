#![forbid(unsafe_code)]

//! Zone tree model and the serde wire format of zoning documents.
//!
//! The tree and its rules are immutable structural input: loaded once,
//! never mutated by the engine. Field spellings follow the documents the
//! engine consumes (`linDiv`, `divDir`, `horDefType`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::path::ZonePath;

/// How a zone splits its volume among its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DivDir {
    /// Children overlap the parent box (layered, not split).
    #[serde(rename = "I")]
    Inner,
    /// Children stack bottom to top along Y.
    #[serde(rename = "V")]
    Vertical,
    /// Children tile along X or Z, see [`HorDefType`].
    #[serde(rename = "H")]
    Horizontal,
}

impl fmt::Display for DivDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "I",
            Self::Vertical => "V",
            Self::Horizontal => "H",
        })
    }
}

impl std::str::FromStr for DivDir {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::Inner),
            "V" => Ok(Self::Vertical),
            "H" => Ok(Self::Horizontal),
            other => Err(ModelError::InvalidDivDir {
                value: other.to_owned(),
            }),
        }
    }
}

/// Horizontal definition type; only meaningful when `divDir` is horizontal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HorDefType {
    /// Axis and order chosen by [`DivElem`].
    #[default]
    #[serde(rename = "P")]
    Plain,
    /// Always split the width, left to right.
    #[serde(rename = "W")]
    WidthAuto,
    /// Always split the depth, back to front.
    #[serde(rename = "D")]
    DepthAuto,
}

impl std::str::FromStr for HorDefType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(Self::Plain),
            "W" => Ok(Self::WidthAuto),
            "D" => Ok(Self::DepthAuto),
            other => Err(ModelError::InvalidHorDefType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Variant selector (0..=3) disambiguating [`HorDefType::Plain`] splits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DivElem(u8);

impl DivElem {
    /// Largest accepted selector.
    pub const MAX: u8 = 3;

    /// Create a selector, rejecting values above [`DivElem::MAX`].
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if value > Self::MAX {
            return Err(ModelError::InvalidDivElem { value });
        }
        Ok(Self(value))
    }

    /// Raw selector value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DivElem {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DivElem> for u8 {
    fn from(value: DivElem) -> Self {
        value.0
    }
}

/// Side of a zone a user may click to select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneSide {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

impl std::str::FromStr for ZoneSide {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FRONT" => Ok(Self::Front),
            "BACK" => Ok(Self::Back),
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            _ => Err(ModelError::InvalidZoneSide {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ZoneSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Front => "FRONT",
            Self::Back => "BACK",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        })
    }
}

/// Relational operator of a [`Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Equal within tolerance.
    #[default]
    #[serde(rename = "=")]
    Eq,
    /// Not equal within tolerance.
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl ComparisonOperator {
    /// Source spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

impl std::str::FromStr for ComparisonOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            other => Err(ModelError::InvalidOperator {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `key <op> value` test; both sides are expressions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comparison {
    pub key: String,
    pub value: String,
    pub operator: ComparisonOperator,
}

impl Comparison {
    pub fn new(key: impl Into<String>, operator: ComparisonOperator, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operator,
        }
    }
}

/// How the comparisons of a [`Condition`] combine.
///
/// Stored as the integer flag of the document format: `0` all, `1` any.
/// Any other flag is kept as-is and never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ConditionOperation {
    /// Every comparison must hold (flag `0`).
    #[default]
    All,
    /// At least one comparison must hold (flag `1`).
    Any,
    /// Unrecognised flag.
    Unknown(u8),
}

impl From<u8> for ConditionOperation {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::All,
            1 => Self::Any,
            other => Self::Unknown(other),
        }
    }
}

impl From<ConditionOperation> for u8 {
    fn from(value: ConditionOperation) -> Self {
        match value {
            ConditionOperation::All => 0,
            ConditionOperation::Any => 1,
            ConditionOperation::Unknown(other) => other,
        }
    }
}

/// A guarded alternative division string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Division-string template used when this condition is selected.
    pub value: String,
    /// Informational node number carried by documents.
    #[serde(default)]
    pub nodenum: u32,
    #[serde(default)]
    pub operation: ConditionOperation,
    #[serde(default)]
    pub comparisons: Vec<Comparison>,
}

impl Condition {
    pub fn new(
        value: impl Into<String>,
        operation: ConditionOperation,
        comparisons: Vec<Comparison>,
    ) -> Self {
        Self {
            value: value.into(),
            nodenum: 0,
            operation,
            comparisons,
        }
    }
}

/// A zone's division rule.
///
/// When `conditions` is non-empty the first matching condition supplies the
/// effective template; otherwise, or when nothing matches, `value` does.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinDiv {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl LinDiv {
    /// Unconditional rule with the given template.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            conditions: Vec::new(),
        }
    }

    /// Add a condition (builder pattern).
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Default template, or `""` when absent.
    #[must_use]
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// A node of the spatial subdivision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Dot-path identifier, unique within the tree.
    pub index: ZonePath,
    #[serde(default)]
    pub lin_div: LinDiv,
    pub div_dir: DivDir,
    #[serde(default)]
    pub div_elem: DivElem,
    #[serde(default)]
    pub hor_def_type: HorDefType,
    /// Ordered children; order is the partition order.
    #[serde(default)]
    pub children: Vec<Zone>,
    /// Transparent container: occupies space but renders nothing itself.
    #[serde(default)]
    pub empty: bool,
    /// Clickable side; `None` means every side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickable: Option<ZoneSide>,
    #[serde(default)]
    pub modifiable: bool,
}

impl Zone {
    /// Create a zone with an empty rule and no children.
    pub fn new(index: impl Into<ZonePath>, div_dir: DivDir) -> Self {
        Self {
            name: None,
            index: index.into(),
            lin_div: LinDiv::default(),
            div_dir,
            div_elem: DivElem::default(),
            hor_def_type: HorDefType::default(),
            children: Vec::new(),
            empty: false,
            clickable: None,
            modifiable: false,
        }
    }

    /// Set an unconditional rule.
    #[must_use]
    pub fn rule(mut self, value: impl Into<String>) -> Self {
        self.lin_div = LinDiv::new(value);
        self
    }

    /// Set the full division rule.
    #[must_use]
    pub fn lin_div(mut self, lin_div: LinDiv) -> Self {
        self.lin_div = lin_div;
        self
    }

    /// Set the horizontal definition type and variant selector.
    #[must_use]
    pub fn horizontal(mut self, hor_def_type: HorDefType, div_elem: DivElem) -> Self {
        self.hor_def_type = hor_def_type;
        self.div_elem = div_elem;
        self
    }

    /// Append children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Zone>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mark the zone as a transparent container.
    #[must_use]
    pub fn empty(mut self, empty: bool) -> Self {
        self.empty = empty;
        self
    }

    /// Mark the zone as user-selectable.
    #[must_use]
    pub fn modifiable(mut self, modifiable: bool) -> Self {
        self.modifiable = modifiable;
        self
    }

    /// Restrict clicks to one side.
    #[must_use]
    pub fn clickable(mut self, side: ZoneSide) -> Self {
        self.clickable = Some(side);
        self
    }

    /// Whether the zone has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first lookup by identifier.
    #[must_use]
    pub fn find(&self, id: &ZonePath) -> Option<&Zone> {
        if &self.index == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Pre-order iterator over this zone and all descendants.
    pub fn iter(&self) -> ZoneIter<'_> {
        ZoneIter { stack: vec![self] }
    }
}

/// Pre-order traversal produced by [`Zone::iter`].
#[derive(Debug)]
pub struct ZoneIter<'a> {
    stack: Vec<&'a Zone>,
}

impl<'a> Iterator for ZoneIter<'a> {
    type Item = &'a Zone;

    fn next(&mut self) -> Option<Self::Item> {
        let zone = self.stack.pop()?;
        self.stack.extend(zone.children.iter().rev());
        Some(zone)
    }
}

/// Root of a zoning document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningData {
    pub zone: Zone,
    /// Overall width expression, e.g. `"($A + $B) mm"`.
    pub width: String,
    pub height: String,
    pub depth: String,
    /// Raw variable definitions: literals or `$NAME` expressions.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"{
        "width": "($ZB_W + $ZL_D) mm",
        "height": "$ZONE_H mm",
        "depth": "4000mm",
        "variables": { "ZB_W": "4000", "ZL_D": "500", "ZONE_H": "3000" },
        "zone": {
            "name": "ROOT",
            "index": "0",
            "divDir": "I",
            "linDiv": { "value": "2*{1}" },
            "divElem": 0,
            "horDefType": "P",
            "clickable": "FRONT",
            "color": "#ffffff",
            "children": [
                {
                    "index": "0.0",
                    "divDir": "H",
                    "horDefType": "W",
                    "linDiv": {
                        "value": "1:1",
                        "conditions": [{
                            "value": "1:2",
                            "nodenum": 4,
                            "operation": 1,
                            "comparisons": [
                                { "key": "$ZB_W", "value": "4000", "operator": ">=" }
                            ]
                        }]
                    },
                    "modifiable": true
                },
                { "index": "0.1", "divDir": "V", "empty": true }
            ]
        }
    }"##;

    #[test]
    fn deserializes_document_wire_format() {
        let data: ZoningData = serde_json::from_str(DOC).unwrap();
        assert_eq!(data.variables.len(), 3);
        assert_eq!(data.zone.div_dir, DivDir::Inner);
        assert_eq!(data.zone.clickable, Some(ZoneSide::Front));
        // presentation-only fields such as `color` are skipped
        assert_eq!(data.zone.name.as_deref(), Some("ROOT"));

        let first = &data.zone.children[0];
        assert_eq!(first.hor_def_type, HorDefType::WidthAuto);
        assert!(first.modifiable);
        let condition = &first.lin_div.conditions[0];
        assert_eq!(condition.operation, ConditionOperation::Any);
        assert_eq!(condition.nodenum, 4);
        assert_eq!(condition.comparisons[0].operator, ComparisonOperator::Ge);

        let second = &data.zone.children[1];
        assert!(second.empty);
        assert_eq!(second.lin_div, LinDiv::default());
        assert_eq!(second.clickable, None);
    }

    #[test]
    fn rejects_out_of_range_div_elem() {
        let bad = r#"{ "index": "0", "divDir": "H", "divElem": 4 }"#;
        assert!(serde_json::from_str::<Zone>(bad).is_err());
    }

    #[test]
    fn rejects_unknown_div_dir_and_operator() {
        assert!(serde_json::from_str::<Zone>(r#"{ "index": "0", "divDir": "X" }"#).is_err());
        let bad = r#"{ "key": "1", "value": "2", "operator": "=>" }"#;
        assert!(serde_json::from_str::<Comparison>(bad).is_err());
    }

    #[test]
    fn unknown_condition_operation_is_preserved() {
        let c: Condition = serde_json::from_str(r#"{ "value": "1", "operation": 7 }"#).unwrap();
        assert_eq!(c.operation, ConditionOperation::Unknown(7));
        assert_eq!(serde_json::to_value(&c).unwrap()["operation"], 7);
    }

    #[test]
    fn find_and_iter_follow_preorder() {
        let data: ZoningData = serde_json::from_str(DOC).unwrap();
        let ids: Vec<&str> = data.zone.iter().map(|z| z.index.as_str()).collect();
        assert_eq!(ids, vec!["0", "0.0", "0.1"]);
        assert!(data.zone.find(&ZonePath::from("0.1")).is_some());
        assert!(data.zone.find(&ZonePath::from("0.2")).is_none());
    }

    #[test]
    fn operator_parse_matches_spelling() {
        for op in [
            ComparisonOperator::Eq,
            ComparisonOperator::Ne,
            ComparisonOperator::Gt,
            ComparisonOperator::Lt,
            ComparisonOperator::Ge,
            ComparisonOperator::Le,
        ] {
            assert_eq!(op.as_str().parse::<ComparisonOperator>(), Ok(op));
        }
        assert!("<>".parse::<ComparisonOperator>().is_err());
    }
}
