//! Forward BFS over a round's reduced graph.
//!
//! One reusable workspace serves both queries the selector needs:
//! - collecting everything reachable from a source (descendant sets), and
//! - testing whether a source reaches some target, stopping on the first hit.
//!
//! A "visited stamp" (`Vec<u32>`) scopes the visited set to one query without
//! re-allocating it per source. Paths have length at least one: the source
//! itself is never reported as reachable from itself.

use crate::dag::ReducedGraph;

#[derive(Debug, Clone, Default)]
pub struct Bfs {
    visited: Vec<u32>,
    stamp: u32,
    queue: Vec<usize>,
}

impl Bfs {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self, dag: &ReducedGraph, source: usize) {
        if self.visited.len() < dag.capacity() {
            self.visited.resize(dag.capacity(), 0);
        }
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            // Wrapped: old marks could alias the new stamp.
            self.visited.fill(0);
            self.stamp = 1;
        }
        self.queue.clear();
        self.visited[source] = self.stamp;
        self.queue.push(source);
    }

    /// Append every node reachable from `source` (excluding it) to `out`.
    ///
    /// Nothing is appended when `source` is not present.
    pub fn collect(&mut self, dag: &ReducedGraph, source: usize, out: &mut Vec<usize>) {
        if !dag.contains(source) {
            return;
        }
        self.begin(dag, source);
        let mut head = 0usize;
        while head < self.queue.len() {
            let cur = self.queue[head];
            head += 1;
            for nx in dag.successors(cur) {
                if self.visited[nx] != self.stamp {
                    self.visited[nx] = self.stamp;
                    self.queue.push(nx);
                    out.push(nx);
                }
            }
        }
    }

    /// Visit `source` and then every node reachable from it, in BFS order.
    ///
    /// `visit` returns whether to expand the node's successors; a node that is
    /// not expanded still counts as visited.
    pub fn walk<F>(&mut self, dag: &ReducedGraph, source: usize, mut visit: F)
    where
        F: FnMut(usize) -> bool,
    {
        if !dag.contains(source) {
            return;
        }
        self.begin(dag, source);
        let mut head = 0usize;
        while head < self.queue.len() {
            let cur = self.queue[head];
            head += 1;
            if !visit(cur) {
                continue;
            }
            for nx in dag.successors(cur) {
                if self.visited[nx] != self.stamp {
                    self.visited[nx] = self.stamp;
                    self.queue.push(nx);
                }
            }
        }
    }

    /// Whether some node satisfying `is_target` is reachable from `source`.
    pub fn reaches<F>(&mut self, dag: &ReducedGraph, source: usize, is_target: F) -> bool
    where
        F: Fn(usize) -> bool,
    {
        if !dag.contains(source) {
            return false;
        }
        self.begin(dag, source);
        let mut head = 0usize;
        while head < self.queue.len() {
            let cur = self.queue[head];
            head += 1;
            for nx in dag.successors(cur) {
                if self.visited[nx] != self.stamp {
                    if is_target(nx) {
                        return true;
                    }
                    self.visited[nx] = self.stamp;
                    self.queue.push(nx);
                }
            }
        }
        false
    }
}

/// Descendants and ancestors of `pivot`, both excluding it.
///
/// Ancestors are found by testing every node outside `{pivot} ∪ D` for a
/// path to the pivot; on success the origin is recorded.
pub fn pivot_partition(bfs: &mut Bfs, dag: &ReducedGraph, pivot: usize) -> (Vec<usize>, Vec<usize>) {
    let mut descendants = Vec::new();
    bfs.collect(dag, pivot, &mut descendants);

    let mut in_d = vec![false; dag.capacity()];
    for &d in &descendants {
        in_d[d] = true;
    }

    let ancestors = dag
        .nodes()
        .filter(|&u| u != pivot && !in_d[u])
        .filter(|&u| bfs.reaches(dag, u, |v| v == pivot))
        .collect::<Vec<_>>();

    (ancestors, descendants)
}
