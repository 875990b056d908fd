#![forbid(unsafe_code)]

//! Resolution of raw variable definitions.
//!
//! # Role
//! A document's variables map names to text that is either a literal
//! (`"1320"`) or an expression over other variables (`"$W / $CNT"`). This
//! module turns that map into numbers without depending on declaration
//! order.
//!
//! # Strategy
//! A [`DepGraph`] is built from the `$NAME` references. Literals are
//! evaluated first; expressions follow in topological order, each reading
//! the values already computed. Variables on a reference cycle start at `0`
//! and are iterated to a fixed point, bounded by
//! [`ResolveOptions::max_fixed_point_passes`].
//!
//! Edits are copy-on-write: [`VariableResolver::update`] returns a new map
//! in which the edited variable and everything that (transitively)
//! references it are refreshed and every other value is carried over.

use std::collections::BTreeMap;

use zonage_core::{UNIT_MARKER, Vec3, ZoningData};

use crate::dep_graph::{DepGraph, VarId};
use crate::variables::{
    VariableMap, evaluate_expression, extract_variable_names, try_evaluate_expression,
};

/// Dimension used when a dimension expression is empty, zero, or invalid.
pub const DEFAULT_DIMENSION: f64 = 5000.0;

/// Knobs for variable and dimension resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    /// Fallback for unusable dimension expressions.
    pub fallback_dimension: f64,
    /// Upper bound on fixed-point passes over cyclic variables.
    pub max_fixed_point_passes: usize,
    /// Largest per-pass change still considered converged.
    pub convergence_epsilon: f64,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fallback_dimension: DEFAULT_DIMENSION,
            max_fixed_point_passes: 32,
            convergence_epsilon: 1e-9,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub fn fallback_dimension(mut self, value: f64) -> Self {
        self.fallback_dimension = value;
        self
    }

    #[must_use]
    pub fn max_fixed_point_passes(mut self, passes: usize) -> Self {
        self.max_fixed_point_passes = passes;
        self
    }

    #[must_use]
    pub fn convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon;
        self
    }
}

/// Whether raw variable text references other variables.
pub fn is_expression(text: &str) -> bool {
    text.contains('$')
}

/// Resolver over one raw definition map.
///
/// Building the resolver parses references once; [`resolve`],
/// [`recompute`] and [`update`] can then be called repeatedly.
///
/// [`resolve`]: VariableResolver::resolve
/// [`recompute`]: VariableResolver::recompute
/// [`update`]: VariableResolver::update
#[derive(Debug, Clone)]
pub struct VariableResolver<'a> {
    raw: &'a BTreeMap<String, String>,
    graph: DepGraph,
    order: Vec<VarId>,
    options: ResolveOptions,
}

impl<'a> VariableResolver<'a> {
    /// Build the dependency graph of `raw`.
    pub fn new(raw: &'a BTreeMap<String, String>) -> Self {
        Self::with_options(raw, ResolveOptions::default())
    }

    pub fn with_options(raw: &'a BTreeMap<String, String>, options: ResolveOptions) -> Self {
        let mut graph = DepGraph::with_capacity(raw.len());
        for name in raw.keys() {
            graph.intern(name);
        }
        for (name, text) in raw {
            let from = graph.intern(name);
            for dep in extract_variable_names(text) {
                let Some(to) = graph.id(&dep) else {
                    continue;
                };
                if let Err(cycle) = graph.add_edge(from, to) {
                    tracing::debug!(%cycle, "variable cycle, resolving by iteration");
                }
            }
        }
        let order = graph.topo_order();
        Self {
            raw,
            graph,
            order,
            options,
        }
    }

    /// The dependency graph.
    #[must_use]
    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    /// Variable names in resolution order.
    pub fn order(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|&id| self.graph.name(id))
    }

    fn text(&self, id: VarId) -> &'a str {
        let raw = self.raw;
        raw.get(self.graph.name(id)).map_or("", String::as_str)
    }

    /// Resolve every variable from its definition.
    #[must_use]
    pub fn resolve(&self) -> VariableMap {
        let mut values = VariableMap::new();
        for (name, text) in self.raw {
            let initial = if is_expression(text) {
                0.0
            } else {
                evaluate_expression(text, &VariableMap::new())
            };
            values.insert(name.clone(), initial);
        }
        let targets = self.expression_ids(self.order.iter().copied());
        self.evaluate_in_order(&targets, &mut values);
        values
    }

    /// Re-evaluate every expression against `current`.
    ///
    /// Literal variables keep their value in `current` (falling back to
    /// their definition when absent). Names in `current` that are not
    /// defined in the raw map are carried over untouched.
    #[must_use]
    pub fn recompute(&self, current: &VariableMap) -> VariableMap {
        let mut values = current.clone();
        for (name, text) in self.raw {
            if !is_expression(text) && !values.contains_key(name) {
                values.insert(name.clone(), evaluate_expression(text, &VariableMap::new()));
            }
        }
        let targets = self.expression_ids(self.order.iter().copied());
        self.evaluate_in_order(&targets, &mut values);
        values
    }

    /// Set `name` to `value` and refresh only what depends on it.
    ///
    /// The edited variable keeps `value` even when it is defined by an
    /// expression. Unknown names are simply inserted.
    #[must_use]
    pub fn update(&mut self, current: &VariableMap, name: &str, value: f64) -> VariableMap {
        let mut values = current.clone();
        values.insert(name.to_owned(), value);
        let Some(edited) = self.graph.id(name) else {
            return values;
        };
        self.graph.mark_dirty(edited);
        let dirty = self.graph.propagate();
        self.graph.clean_all();
        let targets: Vec<VarId> = self
            .expression_ids(dirty.into_iter())
            .into_iter()
            .filter(|&id| id != edited)
            .collect();
        self.evaluate_in_order(&targets, &mut values);
        values
    }

    fn expression_ids(&self, ids: impl Iterator<Item = VarId>) -> Vec<VarId> {
        ids.filter(|&id| is_expression(self.text(id))).collect()
    }

    /// One pass in topological order, then fixed-point passes when the
    /// definitions contain a cycle.
    fn evaluate_in_order(&self, targets: &[VarId], values: &mut VariableMap) {
        let pass = |values: &mut VariableMap| -> f64 {
            let mut max_delta: f64 = 0.0;
            for &id in targets {
                let name = self.graph.name(id);
                let next = evaluate_expression(self.text(id), values);
                let prev = values.insert(name.to_owned(), next).unwrap_or(0.0);
                max_delta = max_delta.max((next - prev).abs());
            }
            max_delta
        };

        pass(values);
        if !self.graph.has_cycles() {
            return;
        }
        for _ in 0..self.options.max_fixed_point_passes {
            if pass(values) <= self.options.convergence_epsilon {
                return;
            }
        }
        let names: Vec<&str> = self
            .graph
            .cyclic_nodes()
            .into_iter()
            .map(|id| self.graph.name(id))
            .collect();
        tracing::warn!(
            variables = ?names,
            passes = self.options.max_fixed_point_passes,
            "cyclic variables did not converge"
        );
    }
}

/// Resolve a raw definition map order-independently.
pub fn resolve_variables(raw: &BTreeMap<String, String>) -> VariableMap {
    VariableResolver::new(raw).resolve()
}

/// Recompute expression variables after literal values in `current` were
/// edited. Returns a new map.
pub fn recompute_variables(raw: &BTreeMap<String, String>, current: &VariableMap) -> VariableMap {
    VariableResolver::new(raw).recompute(current)
}

/// Evaluate a dimension expression, falling back to `fallback`.
///
/// A trailing unit marker is ignored. Empty input, evaluation failures, and
/// a zero result all yield `fallback`.
pub fn resolve_dimension_or(expr: &str, variables: &VariableMap, fallback: f64) -> f64 {
    let trimmed = expr.trim();
    let text = trimmed.strip_suffix(UNIT_MARKER).unwrap_or(trimmed);
    match try_evaluate_expression(text, variables) {
        Ok(value) if value != 0.0 => value,
        Ok(_) => fallback,
        Err(err) => {
            if !text.trim().is_empty() {
                tracing::warn!(expression = expr, error = %err, fallback, "invalid dimension");
            }
            fallback
        }
    }
}

/// [`resolve_dimension_or`] with [`DEFAULT_DIMENSION`].
pub fn resolve_dimension(expr: &str, variables: &VariableMap) -> f64 {
    resolve_dimension_or(expr, variables, DEFAULT_DIMENSION)
}

/// Width, height and depth of a document as `(x, y, z)`.
pub fn resolve_dimensions(
    data: &ZoningData,
    variables: &VariableMap,
    options: &ResolveOptions,
) -> Vec3 {
    let fallback = options.fallback_dimension;
    Vec3::new(
        resolve_dimension_or(&data.width, variables, fallback),
        resolve_dimension_or(&data.height, variables, fallback),
        resolve_dimension_or(&data.depth, variables, fallback),
    )
}
