//! Reduced (component) graph of one round.
//!
//! Nodes are dense component ids `0..n`. Every edge has already been
//! resolved by the live-edge coin, so edges carry no weight. Removal is a
//! tombstone: a removed node keeps its slot but is skipped by every query,
//! which is the same as deleting it together with its incident edges.

#[derive(Debug, Clone, Default)]
pub struct ReducedGraph {
    succ: Vec<Vec<usize>>,
    alive: Vec<bool>,
    live_count: usize,
}

impl ReducedGraph {
    pub fn with_nodes(n: usize) -> Self {
        Self { succ: vec![Vec::new(); n], alive: vec![true; n], live_count: n }
    }

    /// Build from an edge list; self-loops and duplicates are dropped.
    pub fn from_edges(n: usize, mut edges: Vec<(usize, usize)>) -> Self {
        edges.sort_unstable();
        edges.dedup();
        let mut g = Self::with_nodes(n);
        for (u, v) in edges {
            if u != v {
                g.succ[u].push(v);
            }
        }
        g
    }

    /// Add `u -> v` unless it is a self-loop or already present.
    pub fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if u == v || self.succ[u].contains(&v) {
            return false;
        }
        self.succ[u].push(v);
        true
    }

    /// Total slots, removed nodes included.
    pub fn capacity(&self) -> usize {
        self.succ.len()
    }

    /// Nodes still present.
    pub fn node_count(&self) -> usize {
        self.live_count
    }

    pub fn edge_count(&self) -> usize {
        self.nodes().map(|u| self.out_degree(u)).sum()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.alive.get(node).copied().unwrap_or(false)
    }

    /// Present nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.succ.len()).filter(move |&u| self.alive[u])
    }

    /// Present successors of a present node.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        let list: &[usize] = if self.contains(node) { &self.succ[node] } else { &[] };
        list.iter().copied().filter(move |&v| self.alive[v])
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.successors(node).count()
    }

    /// Remove a node and, implicitly, its incident edges.
    pub fn remove(&mut self, node: usize) -> bool {
        if !self.contains(node) {
            return false;
        }
        self.alive[node] = false;
        self.live_count -= 1;
        true
    }

    /// Present node with the largest out-degree, first one on ties.
    pub fn max_out_degree_node(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for u in self.nodes() {
            let deg = self.out_degree(u);
            match best {
                Some((_, d)) if deg <= d => {}
                _ => best = Some((u, deg)),
            }
        }
        best.map(|(u, _)| u)
    }

    /// Kahn's algorithm over present nodes; `None` if a cycle exists.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let mut indeg = vec![0usize; self.succ.len()];
        for u in self.nodes() {
            for v in self.successors(u) {
                indeg[v] += 1;
            }
        }
        let mut order: Vec<usize> = self.nodes().filter(|&u| indeg[u] == 0).collect();
        let mut head = 0usize;
        while head < order.len() {
            let u = order[head];
            head += 1;
            for v in self.successors(u) {
                indeg[v] -= 1;
                if indeg[v] == 0 {
                    order.push(v);
                }
            }
        }
        (order.len() == self.live_count).then_some(order)
    }
}
