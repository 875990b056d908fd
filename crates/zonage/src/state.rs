#![forbid(unsafe_code)]

//! Explicit application state.
//!
//! [`ZoningState`] holds a document together with everything derived from
//! it: resolved variable values, overall dimensions, and the selection.
//! Operations never mutate in place. Each one returns a new state, so a
//! layout computed from an older state stays valid while an edit is
//! applied.
//!
//! # Example
//!
//! ```
//! use zonage::{ZoningData, ZoningState};
//!
//! let data: ZoningData = serde_json::from_str(r#"{
//!     "width": "$W mm", "height": "2000mm", "depth": "600mm",
//!     "variables": { "W": "1200", "HALF": "$W / 2" },
//!     "zone": { "index": "0", "divDir": "V" }
//! }"#).unwrap();
//!
//! let state = ZoningState::new(data);
//! assert_eq!(state.values()["HALF"], 600.0);
//!
//! let wider = state.update_value("W", 3000.0).unwrap();
//! assert_eq!(wider.values()["HALF"], 1500.0);
//! assert_eq!(wider.dimensions().x, 3000.0);
//! assert_eq!(state.values()["HALF"], 600.0);
//! ```

use rand::Rng;
use zonage_core::{Axis, Box3, Vec3, Zone, ZonePath, ZoneSide, ZoningData};
use zonage_expr::{ResolveOptions, VariableMap, VariableResolver, resolve_dimensions};
use zonage_layout::{ZoneLocation, ZonePlacement, ZoneWalker, parse_division_rule_with_variables};

use crate::error::{Error, Result};
use crate::randomize::randomize_variables;
use crate::selection::{
    SelectedZone, ZoneInteraction, annotate, find_closest_modifiable_parent, is_zone_modifiable,
};

/// World units per document unit, for renderers.
pub const DEFAULT_SCALE: f64 = 0.01;

/// A document and everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoningState {
    data: ZoningData,
    values: VariableMap,
    dimensions: Vec3,
    selected: Option<SelectedZone>,
    show_overview: bool,
    scale: f64,
    options: ResolveOptions,
}

impl ZoningState {
    /// Resolve `data` with default options.
    pub fn new(data: ZoningData) -> Self {
        Self::with_options(data, ResolveOptions::default())
    }

    /// Resolve `data`; selection starts on the root with the overview shown.
    pub fn with_options(data: ZoningData, options: ResolveOptions) -> Self {
        let values = VariableResolver::with_options(&data.variables, options).resolve();
        let dimensions = resolve_dimensions(&data, &values, &options);
        tracing::debug!(
            variables = values.len(),
            width = dimensions.x,
            height = dimensions.y,
            depth = dimensions.z,
            "zoning state created"
        );
        Self {
            data,
            values,
            dimensions,
            selected: Some(SelectedZone::root()),
            show_overview: true,
            scale: DEFAULT_SCALE,
            options,
        }
    }

    // ── Accessors ──

    pub fn data(&self) -> &ZoningData {
        &self.data
    }

    pub fn root(&self) -> &Zone {
        &self.data.zone
    }

    /// Resolved variable values.
    pub fn values(&self) -> &VariableMap {
        &self.values
    }

    /// Overall `(width, height, depth)`.
    pub fn dimensions(&self) -> Vec3 {
        self.dimensions
    }

    /// Box handed to the root zone: centred on the origin.
    pub fn bounds(&self) -> Box3 {
        Box3::from_size(self.dimensions)
    }

    pub fn selected(&self) -> Option<&SelectedZone> {
        self.selected.as_ref()
    }

    pub fn show_overview(&self) -> bool {
        self.show_overview
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    // ── Variable and dimension edits ──

    fn with_values(&self, values: VariableMap) -> Self {
        let dimensions = resolve_dimensions(&self.data, &values, &self.options);
        Self {
            values,
            dimensions,
            ..self.clone()
        }
    }

    /// Set variable `name` and refresh the variables and dimensions that
    /// depend on it.
    pub fn update_value(&self, name: &str, value: f64) -> Result<Self> {
        if !self.data.variables.contains_key(name) {
            return Err(Error::UnknownVariable {
                name: name.to_owned(),
            });
        }
        let mut resolver = VariableResolver::with_options(&self.data.variables, self.options);
        let values = resolver.update(&self.values, name, value);
        tracing::debug!(name, value, "variable updated");
        Ok(self.with_values(values))
    }

    /// Override one overall dimension.
    ///
    /// The override lasts until the next variable edit recomputes the
    /// dimension expressions.
    #[must_use]
    pub fn update_dimension(&self, axis: Axis, value: f64) -> Self {
        Self {
            dimensions: self.dimensions.with(axis, value),
            ..self.clone()
        }
    }

    /// Redraw every literal variable within its editing range.
    #[must_use]
    pub fn randomize_values<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        self.with_values(randomize_variables(&self.data.variables, &self.values, rng))
    }

    /// Back to the document's own definitions.
    #[must_use]
    pub fn reset_values(&self) -> Self {
        let values = VariableResolver::with_options(&self.data.variables, self.options).resolve();
        self.with_values(values)
    }

    // ── Selection ──

    /// Select zone `id`, or clear the selection when it is already selected.
    pub fn select_zone(&self, id: &ZonePath, side: ZoneSide) -> Result<Self> {
        if self.data.zone.find(id).is_none() {
            return Err(Error::from(zonage_layout::LayoutError::ZoneNotFound {
                id: id.clone(),
            }));
        }
        let selected = match &self.selected {
            Some(current) if current.id == *id => None,
            _ => Some(SelectedZone::new(id.clone(), side)),
        };
        Ok(Self {
            selected,
            show_overview: false,
            ..self.clone()
        })
    }

    /// Move the selection to its closest modifiable ancestor.
    ///
    /// Does nothing when nothing or the root is selected. The new selection
    /// faces the ancestor's clickable side, or the front when it has none.
    #[must_use]
    pub fn select_parent(&self) -> Self {
        let Some(current) = self.selected.as_ref().filter(|s| !s.id.is_root()) else {
            return self.clone();
        };
        let parent = find_closest_modifiable_parent(&self.data.zone, &current.id);
        let side = self
            .data
            .zone
            .find(&parent)
            .and_then(|zone| zone.clickable)
            .unwrap_or_default();
        Self {
            selected: Some(SelectedZone::new(parent, side)),
            show_overview: false,
            ..self.clone()
        }
    }

    /// Root selected, overview shown.
    #[must_use]
    pub fn overview(&self) -> Self {
        Self {
            selected: Some(SelectedZone::root()),
            show_overview: true,
            ..self.clone()
        }
    }

    /// Root selected, overview hidden.
    #[must_use]
    pub fn reset_view(&self) -> Self {
        Self {
            selected: Some(SelectedZone::root()),
            show_overview: false,
            ..self.clone()
        }
    }

    // ── Queries ──

    /// Whether the selection has somewhere to go up to.
    pub fn has_parent_zone(&self) -> bool {
        self.selected.as_ref().is_some_and(|s| !s.id.is_root())
    }

    /// Division string of the selected zone's rule, or `""`.
    pub fn processed_lindiv(&self) -> String {
        self.selected
            .as_ref()
            .and_then(|s| self.data.zone.find(&s.id))
            .map(|zone| parse_division_rule_with_variables(&zone.lin_div, &self.values))
            .unwrap_or_default()
    }

    pub fn find_closest_modifiable_parent(&self, id: &ZonePath) -> ZonePath {
        find_closest_modifiable_parent(&self.data.zone, id)
    }

    pub fn is_zone_modifiable(&self, id: &ZonePath) -> bool {
        is_zone_modifiable(&self.data.zone, id)
    }

    /// Interaction state of every zone under the current selection.
    pub fn interactions(&self) -> Vec<ZoneInteraction> {
        annotate(&self.data.zone, self.selected.as_ref().map(|s| &s.id))
    }

    fn walker(&self) -> ZoneWalker<'_> {
        ZoneWalker::new(&self.data.zone, self.bounds(), &self.values)
    }

    /// Geometry of every rendered zone.
    pub fn layout_all(&self) -> Vec<ZonePlacement> {
        self.walker().layout_all()
    }

    /// Geometry of zone `id`.
    pub fn locate(&self, id: &ZonePath) -> Option<ZoneLocation> {
        self.walker().locate(id)
    }
}
