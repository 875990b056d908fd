#![forbid(unsafe_code)]

//! Dependency graph between variables.
//!
//! # Design
//!
//! Every variable of a raw definition map is a node. An edge `A → B` means
//! "the expression of `A` references `$B`", so `B` must be resolved before
//! `A`.
//!
//! ## Data Structure: Per-Node Adjacency Lists
//!
//! Names are interned to compact [`VarId`]s in declaration order. Edges are
//! stored in per-node `Vec<VarId>` lists for both forward (dependencies) and
//! reverse (dependents) directions.
//!
//! | Operation            | Time         |
//! |----------------------|--------------|
//! | Intern name          | O(1) amort.  |
//! | Add dependency edge  | O(V+E) cycle |
//! | Topological order    | O(V log V+E) |
//! | Propagate dirty      | O(k)         |
//!
//! # Cycle Detection
//!
//! Before adding `A → B` the graph checks that `B` cannot already reach
//! `A`. A closing edge is not inserted; it is returned as a [`CycleError`]
//! and remembered, so the stored graph is always a DAG and callers can
//! treat the variables involved with a fixed-point pass.
//!
//! # Deterministic Traversal
//!
//! Ties in the topological order are broken by ascending [`VarId`], so the
//! same definitions always resolve in the same order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

use rustc_hash::FxHashMap;

// ============================================================================
// VarId
// ============================================================================

/// Interned handle of a variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    /// Get the raw u32 index.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

// ============================================================================
// CycleError
// ============================================================================

/// An edge that would have closed a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Variable whose expression holds the reference.
    pub from: String,
    /// Referenced variable.
    pub to: String,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variable cycle detected: ${} → ${} would create a cycle",
            self.from, self.to
        )
    }
}

impl std::error::Error for CycleError {}

// ============================================================================
// DepGraph
// ============================================================================

/// Dependency graph over variable names.
///
/// # Examples
///
/// ```
/// use zonage_expr::dep_graph::DepGraph;
///
/// let mut graph = DepGraph::new();
/// let width = graph.intern("WIDTH");
/// let step = graph.intern("STEP");
/// graph.add_edge(step, width).unwrap(); // STEP depends on WIDTH
///
/// graph.mark_dirty(width);
/// let dirty = graph.propagate();
/// assert_eq!(dirty, vec![width, step]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    names: Vec<String>,
    ids: FxHashMap<String, VarId>,
    /// Forward adjacency: `fwd_adj[i]` = variables that `i` references.
    fwd_adj: Vec<Vec<VarId>>,
    /// Reverse adjacency: `rev_adj[i]` = variables that reference `i`.
    rev_adj: Vec<Vec<VarId>>,
    dirty: Vec<bool>,
    pending_dirty: Vec<VarId>,
    rejected: Vec<(VarId, VarId)>,
}

impl DepGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with room for `node_cap` variables.
    #[must_use]
    pub fn with_capacity(node_cap: usize) -> Self {
        Self {
            names: Vec::with_capacity(node_cap),
            ids: FxHashMap::with_capacity_and_hasher(node_cap, Default::default()),
            fwd_adj: Vec::with_capacity(node_cap),
            rev_adj: Vec::with_capacity(node_cap),
            dirty: Vec::with_capacity(node_cap),
            ..Self::default()
        }
    }

    /// Id of `name`, adding a node on first sight.
    pub fn intern(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = VarId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        self.fwd_adj.push(Vec::new());
        self.rev_adj.push(Vec::new());
        self.dirty.push(false);
        id
    }

    /// Id of an already interned name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<VarId> {
        self.ids.get(name).copied()
    }

    /// Name behind an id.
    #[must_use]
    pub fn name(&self, id: VarId) -> &str {
        self.names.get(id.idx()).map_or("", String::as_str)
    }

    /// Number of variables.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of stored (acyclic) edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.fwd_adj.iter().map(Vec::len).sum()
    }

    /// Record that `from` references `to`.
    ///
    /// Duplicate edges are ignored. An edge that would close a cycle
    /// (including a self reference) is not stored and is returned as an
    /// error; it stays visible through [`DepGraph::rejected_edges`].
    pub fn add_edge(&mut self, from: VarId, to: VarId) -> Result<(), CycleError> {
        if self.fwd_adj[from.idx()].contains(&to) {
            return Ok(());
        }
        if from == to || self.can_reach(to, from) {
            self.rejected.push((from, to));
            return Err(CycleError {
                from: self.name(from).to_owned(),
                to: self.name(to).to_owned(),
            });
        }
        self.fwd_adj[from.idx()].push(to);
        self.rev_adj[to.idx()].push(from);
        Ok(())
    }

    /// Check if `from` can reach `to` via forward edges (DFS).
    fn can_reach(&self, from: VarId, to: VarId) -> bool {
        let mut visited = vec![false; self.names.len()];
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if visited[current.idx()] {
                continue;
            }
            visited[current.idx()] = true;
            for &dep in &self.fwd_adj[current.idx()] {
                if !visited[dep.idx()] {
                    stack.push(dep);
                }
            }
        }
        false
    }

    /// Edges refused because they closed a cycle.
    #[must_use]
    pub fn rejected_edges(&self) -> &[(VarId, VarId)] {
        &self.rejected
    }

    /// Whether any cycle was seen.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        !self.rejected.is_empty()
    }

    /// Variables that take part in a refused edge, sorted.
    #[must_use]
    pub fn cyclic_nodes(&self) -> Vec<VarId> {
        let mut nodes: Vec<VarId> = self
            .rejected
            .iter()
            .flat_map(|&(from, to)| [from, to])
            .collect();
        nodes.sort();
        nodes.dedup();
        nodes
    }

    /// Variables that `id` references.
    #[must_use]
    pub fn dependencies(&self, id: VarId) -> &[VarId] {
        self.fwd_adj.get(id.idx()).map_or(&[], Vec::as_slice)
    }

    /// Variables that reference `id`.
    #[must_use]
    pub fn dependents(&self, id: VarId) -> &[VarId] {
        self.rev_adj.get(id.idx()).map_or(&[], Vec::as_slice)
    }

    /// All variables, dependencies before dependents (Kahn's algorithm).
    #[must_use]
    pub fn topo_order(&self) -> Vec<VarId> {
        let n = self.names.len();
        let mut remaining: Vec<usize> = self.fwd_adj.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<VarId>> = (0..n)
            .filter(|&i| remaining[i] == 0)
            .map(|i| Reverse(VarId(i as u32)))
            .collect();
        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            for &dependent in &self.rev_adj[id.idx()] {
                remaining[dependent.idx()] -= 1;
                if remaining[dependent.idx()] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }
        order
    }

    /// Mark a variable as changed. It and its transitive dependents are
    /// returned by the next [`DepGraph::propagate`].
    pub fn mark_dirty(&mut self, id: VarId) {
        if id.idx() < self.names.len() {
            self.pending_dirty.push(id);
        }
    }

    /// Propagate dirtiness from pending variables to all transitive
    /// dependents via BFS on reverse edges.
    ///
    /// Refused cycle edges count as dependencies here, so every member of a
    /// cycle touched by the change is dirtied. The dirty set is returned in
    /// topological order.
    pub fn propagate(&mut self) -> Vec<VarId> {
        if self.pending_dirty.is_empty() {
            return Vec::new();
        }
        let mut queue: VecDeque<VarId> = VecDeque::new();
        for id in self.pending_dirty.drain(..) {
            if !self.dirty[id.idx()] {
                self.dirty[id.idx()] = true;
                queue.push_back(id);
            }
        }
        while let Some(current) = queue.pop_front() {
            let back_edges = self
                .rejected
                .iter()
                .filter(|&&(_, to)| to == current)
                .map(|&(from, _)| from);
            let dependents: Vec<VarId> = self.rev_adj[current.idx()]
                .iter()
                .copied()
                .chain(back_edges)
                .collect();
            for dependent in dependents {
                if !self.dirty[dependent.idx()] {
                    self.dirty[dependent.idx()] = true;
                    queue.push_back(dependent);
                }
            }
        }
        self.topo_order()
            .into_iter()
            .filter(|id| self.dirty[id.idx()])
            .collect()
    }

    /// Check if a variable is currently dirty.
    #[must_use]
    pub fn is_dirty(&self, id: VarId) -> bool {
        self.dirty.get(id.idx()).copied().unwrap_or(false)
    }

    /// Clear all dirty marks.
    pub fn clean_all(&mut self) {
        self.dirty.fill(false);
        self.pending_dirty.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut g = DepGraph::new();
        let a = g.intern("A");
        let b = g.intern("B");
        assert_eq!(g.intern("A"), a);
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.name(b), "B");
        assert_eq!(g.id("C"), None);
    }

    #[test]
    fn reference_creates_dependency() {
        let mut g = DepGraph::new();
        let a = g.intern("A");
        let b = g.intern("B");
        g.add_edge(a, b).unwrap();
        g.add_edge(a, b).unwrap();
        assert_eq!(g.dependencies(a), &[b]);
        assert_eq!(g.dependents(b), &[a]);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut g = DepGraph::new();
        let a = g.intern("A");
        let err = g.add_edge(a, a).unwrap_err();
        assert_eq!(err.from, "A");
        assert_eq!(err.to, "A");
        assert!(g.has_cycles());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn three_variable_cycle_rejected() {
        let mut g = DepGraph::new();
        let a = g.intern("A");
        let b = g.intern("B");
        let c = g.intern("C");
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        assert!(g.add_edge(c, a).is_err());
        assert_eq!(g.cyclic_nodes(), vec![a, c]);
        assert_eq!(
            g.add_edge(c, a).unwrap_err().to_string(),
            "variable cycle detected: $C → $A would create a cycle"
        );
    }

    #[test]
    fn topo_order_puts_dependencies_first() {
        // STEP = WIDTH / COUNT, AREA = STEP * DEPTH
        let mut g = DepGraph::new();
        let area = g.intern("AREA");
        let count = g.intern("COUNT");
        let depth = g.intern("DEPTH");
        let step = g.intern("STEP");
        let width = g.intern("WIDTH");
        g.add_edge(area, step).unwrap();
        g.add_edge(area, depth).unwrap();
        g.add_edge(step, width).unwrap();
        g.add_edge(step, count).unwrap();

        let order = g.topo_order();
        let pos = |id: VarId| order.iter().position(|&x| x == id).unwrap();
        assert_eq!(order.len(), 5);
        assert!(pos(width) < pos(step));
        assert!(pos(count) < pos(step));
        assert!(pos(step) < pos(area));
        assert!(pos(depth) < pos(area));
        assert_eq!(order[0], count);
    }

    #[test]
    fn edit_reaches_transitive_dependents() {
        let mut g = DepGraph::new();
        let a = g.intern("A");
        let b = g.intern("B");
        let c = g.intern("C");
        let unrelated = g.intern("D");
        g.add_edge(b, a).unwrap();
        g.add_edge(c, b).unwrap();

        g.mark_dirty(a);
        assert_eq!(g.propagate(), vec![a, b, c]);
        assert!(!g.is_dirty(unrelated));

        g.clean_all();
        assert!(!g.is_dirty(a));
        assert!(g.propagate().is_empty());
    }

    #[test]
    fn propagate_crosses_refused_edges() {
        let mut g = DepGraph::new();
        let a = g.intern("A");
        let b = g.intern("B");
        g.add_edge(a, b).unwrap();
        let _ = g.add_edge(b, a);

        g.mark_dirty(a);
        let dirty = g.propagate();
        assert!(dirty.contains(&a));
        assert!(dirty.contains(&b));
    }
}
