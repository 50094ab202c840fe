//! State of one Monte-Carlo round: the contracted sample, the pivot split,
//! and the memoized marginal gains.
//!
//! A round is built once per selection call and then only changes through
//! [`Round::update`], which prunes what a new seed already reaches and marks
//! stale gains. [`Round::gain`] recomputes lazily.
//!
//! Gain of component `v` is the number of non-activated graph nodes in
//! the components reachable from `v`, `v` included. With no seeds chosen yet,
//! an ancestor `v` of the pivot `h` reuses `h`'s gain: everything `h` reaches
//! is `{h} ∪ D`, so the walk from `v` adds only what lies outside `{h} ∪ D`.
//! The result equals the plain walk from `v`; the pivot's cached value just
//! saves re-walking the (usually large) descendant region once per ancestor.

use std::collections::HashSet;

use rand::Rng;

use crate::contract::{contract, Contraction};
use crate::dag::ReducedGraph;
use crate::graph::{GraphSnapshot, NodeId};
use crate::influence::Sampler;
use crate::reachability::{pivot_partition, Bfs};

pub struct Round<'g> {
    snapshot: &'g GraphSnapshot,
    component_of: Vec<usize>,
    members: Vec<Vec<usize>>,
    dag: ReducedGraph,
    pivot: Option<usize>,
    ancestors: Vec<usize>,
    descendants: Vec<usize>,
    in_ancestors: Vec<bool>,
    in_descendants: Vec<bool>,
    fresh: Vec<bool>,
    cache: Vec<f64>,
    bfs: Bfs,
}

impl<'g> Round<'g> {
    /// Sample and contract a round, then split it around its pivot.
    ///
    /// Activated nodes stay in the sample (they still relay influence) but are
    /// dropped from component membership, so they never count towards a gain.
    pub fn build<R: Rng>(
        snapshot: &'g GraphSnapshot,
        sampler: &Sampler,
        activated: &HashSet<NodeId>,
        rng: &mut R,
    ) -> Self {
        let Contraction { component_of, mut members, dag } = contract(snapshot, sampler, rng);
        if !activated.is_empty() {
            for list in &mut members {
                list.retain(|&i| !activated.contains(&snapshot.id(i)));
            }
        }

        let mut bfs = Bfs::new();
        let pivot = dag.max_out_degree_node();
        let (ancestors, descendants) = match pivot {
            Some(h) => pivot_partition(&mut bfs, &dag, h),
            None => (Vec::new(), Vec::new()),
        };

        let n = dag.capacity();
        let mut in_ancestors = vec![false; n];
        for &a in &ancestors {
            in_ancestors[a] = true;
        }
        let mut in_descendants = vec![false; n];
        for &d in &descendants {
            in_descendants[d] = true;
        }

        tracing::debug!(
            components = n,
            dag_edges = dag.edge_count(),
            pivot = ?pivot,
            ancestors = ancestors.len(),
            descendants = descendants.len(),
            "contracted round"
        );

        Self {
            snapshot,
            component_of,
            members,
            dag,
            pivot,
            ancestors,
            descendants,
            in_ancestors,
            in_descendants,
            fresh: vec![false; n],
            cache: vec![0.0; n],
            bfs,
        }
    }

    /// Marginal gain of adding `node` to `seeds` in this round.
    ///
    /// Returns 0 for unknown nodes and for nodes whose component was pruned.
    pub fn gain(&mut self, node: NodeId, seeds: &HashSet<NodeId>) -> f64 {
        match self.component_of(node) {
            Some(v) => self.component_gain(v, seeds),
            None => 0.0,
        }
    }

    fn component_gain(&mut self, v: usize, seeds: &HashSet<NodeId>) -> f64 {
        if !self.dag.contains(v) {
            return 0.0;
        }
        if self.fresh[v] {
            return self.cache[v];
        }
        self.fresh[v] = true;

        let via_pivot = match self.pivot {
            Some(h) if seeds.is_empty() && self.in_ancestors[v] => Some(h),
            _ => None,
        };
        let mut total = match via_pivot {
            Some(h) => self.component_gain(h, seeds),
            None => 0.0,
        };

        let members = &self.members;
        let in_descendants = &self.in_descendants;
        self.bfs.walk(&self.dag, v, |u| {
            if let Some(h) = via_pivot {
                if u == h || in_descendants[u] {
                    return false;
                }
            }
            total += members[u].len() as f64;
            true
        });

        self.cache[v] = total;
        total
    }

    /// Account for `node` having been chosen as a seed.
    ///
    /// Removes the component of `node` and everything it reaches, and marks
    /// stale every cached gain whose component could reach the removed set.
    /// Returns how many components were removed.
    pub fn update(&mut self, node: NodeId) -> usize {
        let Some(t) = self.component_of(node) else {
            return 0;
        };
        if !self.dag.contains(t) {
            return 0;
        }

        let mut desc = vec![t];
        self.bfs.collect(&self.dag, t, &mut desc);
        let mut in_desc = vec![false; self.dag.capacity()];
        for &d in &desc {
            in_desc[d] = true;
        }

        let mut invalidated = 0usize;
        for c in self.dag.nodes() {
            if self.fresh[c]
                && !in_desc[c]
                && self.bfs.reaches(&self.dag, c, |u| in_desc[u])
            {
                self.fresh[c] = false;
                invalidated += 1;
            }
        }

        for &d in &desc {
            self.dag.remove(d);
            self.fresh[d] = false;
        }

        tracing::trace!(node, removed = desc.len(), invalidated, "pruned round");
        desc.len()
    }

    /// Component containing `node`, if the node is part of the sample.
    pub fn component_of(&self, node: NodeId) -> Option<usize> {
        self.snapshot.index_of(node).map(|i| self.component_of[i])
    }

    /// Non-activated members of component `c`; empty for an unknown id.
    pub fn members(&self, c: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.members.get(c).into_iter().flatten().map(|&i| self.snapshot.id(i))
    }

    pub fn component_count(&self) -> usize {
        self.members.len()
    }

    pub fn dag(&self) -> &ReducedGraph {
        &self.dag
    }

    pub fn pivot(&self) -> Option<usize> {
        self.pivot
    }

    /// Components that reach the pivot, as of construction.
    pub fn ancestors(&self) -> &[usize] {
        &self.ancestors
    }

    /// Components the pivot reaches, as of construction.
    pub fn descendants(&self) -> &[usize] {
        &self.descendants
    }

    /// Whether the cached gain of component `c` is current.
    pub fn is_fresh(&self, c: usize) -> bool {
        self.fresh.get(c).copied().unwrap_or(false)
    }
}
