//! Live-edge sampling fused with SCC contraction.
//!
//! Tarjan's algorithm, except an edge is only followed if a fresh uniform
//! draw falls below its live probability for the round. Edges the DFS never
//! examines are never sampled. The DFS uses an explicit frame stack
//! `(node, next_edge)`; lowlink updates happen in the same order as the
//! recursive formulation (child's lowlink folds into the parent right after
//! the child's frame is popped, after any SCC the child closed is emitted).
//!
//! Every live edge is remembered; once components are known, the ones that
//! cross components become reduced-graph edges. This is the full condensation
//! rather than only the DFS tree edges between components, which would depend
//! on node order (a hub visited after its leaves would lose its out-edges). Component ids come out in
//! reverse topological order: a live edge that crosses components always
//! points from a higher id to a lower one, so the reduced graph is acyclic.

use rand::Rng;

use crate::dag::ReducedGraph;
use crate::graph::GraphSnapshot;
use crate::influence::Sampler;

const UNVISITED: usize = usize::MAX;

/// Result of contracting one sampled round.
#[derive(Debug, Clone)]
pub struct Contraction {
    /// Snapshot node index -> component id.
    pub component_of: Vec<usize>,
    /// Component id -> snapshot node indices, ascending.
    pub members: Vec<Vec<usize>>,
    /// Condensation of the live-edge sample.
    pub dag: ReducedGraph,
}

impl Contraction {
    pub fn component_count(&self) -> usize {
        self.members.len()
    }
}

/// Sample one round and contract its strongly connected components.
pub fn contract<R: Rng>(
    snapshot: &GraphSnapshot,
    sampler: &Sampler,
    rng: &mut R,
) -> Contraction {
    let n = snapshot.node_count();

    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut component_of = vec![UNVISITED; n];
    let mut members: Vec<Vec<usize>> = Vec::new();

    let mut next_index = 0usize;
    let mut stack: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, usize)> = Vec::new();
    let mut live_edges: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            let edges = snapshot.edges_ref(v);
            if frame.1 < edges.len() {
                let (w, influence) = edges[frame.1];
                frame.1 += 1;

                let live = sampler.draw(&influence);
                let dice: f64 = rng.random();
                if dice >= live {
                    continue;
                }
                live_edges.push((v, w));

                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if lowlink[v] == index[v] {
                let cid = members.len();
                let mut scc = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component_of[w] = cid;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                scc.sort_unstable();
                members.push(scc);
            }
            if let Some(&(parent, _)) = frames.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
        }
    }

    let cross: Vec<(usize, usize)> = live_edges
        .into_iter()
        .map(|(v, w)| (component_of[v], component_of[w]))
        .filter(|(a, b)| a != b)
        .collect();
    let dag = ReducedGraph::from_edges(members.len(), cross);

    Contraction { component_of, members, dag }
}
