//! Graph adapter traits and the concrete influence graph.
//!
//! Selection only needs two things from a graph: the node list (in a stable
//! order, which doubles as the tie-break order) and each node's outgoing edges
//! with their [`Influence`]. Anything implementing [`InfluenceGraph`] works.

use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

use crate::error::PmcError;
use crate::influence::Influence;

/// Opaque node identifier.
pub type NodeId = u64;

pub trait InfluenceGraph {
    /// All nodes, in iteration order.
    fn nodes(&self) -> Vec<NodeId>;
    /// Outgoing `(target, influence)` pairs of `node`; empty for unknown nodes.
    fn out_edges(&self, node: NodeId) -> Vec<(NodeId, Influence)>;

    fn node_count(&self) -> usize {
        self.nodes().len()
    }
    fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).len()
    }
}

/// Mutable directed graph, nodes ordered by id.
#[derive(Debug, Clone, Default)]
pub struct EdgeListGraph {
    adj: BTreeMap<NodeId, Vec<(NodeId, Influence)>>,
}

impl EdgeListGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `src tgt prob` lines as fixed-probability edges.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_edge_list<R: BufRead>(reader: R) -> Result<Self, PmcError> {
        Self::parse_edges(reader, Influence::Fixed)
    }

    /// Load `src tgt prob` lines as Beta beliefs with the given prior.
    ///
    /// The probability column is validated but only the prior is kept: the
    /// learner starts from `Beta(alpha, beta)` on every edge.
    pub fn from_edge_list_with_prior<R: BufRead>(
        reader: R,
        alpha: f64,
        beta: f64,
    ) -> Result<Self, PmcError> {
        Self::parse_edges(reader, |_| Influence::Beta { alpha, beta })
    }

    fn parse_edges<R, F>(reader: R, make: F) -> Result<Self, PmcError>
    where
        R: BufRead,
        F: Fn(f64) -> Influence,
    {
        let mut g = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_no + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut fields = trimmed.split_whitespace();
            let (Some(src), Some(tgt), Some(prob), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(PmcError::Parse {
                    line: line_no,
                    message: format!("expected `src tgt prob`, got {trimmed:?}"),
                });
            };
            let parse_id = |s: &str| {
                s.parse::<NodeId>().map_err(|e| PmcError::Parse {
                    line: line_no,
                    message: format!("bad node id {s:?}: {e}"),
                })
            };
            let src = parse_id(src)?;
            let tgt = parse_id(tgt)?;
            let prob = prob.parse::<f64>().map_err(|e| PmcError::Parse {
                line: line_no,
                message: format!("bad probability {prob:?}: {e}"),
            })?;
            if !(0.0..=1.0).contains(&prob) {
                return Err(PmcError::InvalidProbability { line: line_no, value: prob });
            }
            g.add_edge(src, tgt, make(prob));
        }
        Ok(g)
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.adj.entry(node).or_default();
    }

    /// Add `source -> target`, creating both endpoints. A parallel edge is replaced.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, influence: Influence) {
        self.add_node(target);
        let edges = self.adj.entry(source).or_default();
        match edges.iter_mut().find(|(t, _)| *t == target) {
            Some(slot) => slot.1 = influence,
            None => edges.push((target, influence)),
        }
    }

    /// Remove a node and every edge touching it. Returns whether it existed.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if self.adj.remove(&node).is_none() {
            return false;
        }
        for edges in self.adj.values_mut() {
            edges.retain(|(t, _)| *t != node);
        }
        true
    }

    /// Remove `source -> target`. Returns whether it existed.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        let Some(edges) = self.adj.get_mut(&source) else {
            return false;
        };
        let before = edges.len();
        edges.retain(|(t, _)| *t != target);
        edges.len() != before
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        self.adj.contains_key(&node)
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.adj
            .get(&source)
            .is_some_and(|edges| edges.iter().any(|(t, _)| *t == target))
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(Vec::len).sum()
    }

    /// Borrowed outgoing edges of `node`.
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, Influence)] {
        self.adj.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn influence_mut(&mut self, source: NodeId, target: NodeId) -> Option<&mut Influence> {
        self.adj
            .get_mut(&source)?
            .iter_mut()
            .find(|(t, _)| *t == target)
            .map(|(_, inf)| inf)
    }
}

impl InfluenceGraph for EdgeListGraph {
    fn nodes(&self) -> Vec<NodeId> {
        self.adj.keys().copied().collect()
    }
    fn out_edges(&self, node: NodeId) -> Vec<(NodeId, Influence)> {
        self.neighbors(node).to_vec()
    }
    fn node_count(&self) -> usize {
        self.adj.len()
    }
    fn out_degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }
}

/// Dense read-only copy of an [`InfluenceGraph`].
///
/// Built once per selection call and shared by every round, so the
/// contractor works on `usize` indices instead of hashing ids.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    adj: Vec<Vec<(usize, Influence)>>,
}

impl GraphSnapshot {
    pub fn new<G: InfluenceGraph + ?Sized>(graph: &G) -> Self {
        let ids = graph.nodes();
        let index: HashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let adj = ids
            .iter()
            .map(|&id| {
                graph
                    .out_edges(id)
                    .into_iter()
                    // Edges to nodes outside `nodes()` are ignored.
                    .filter_map(|(t, inf)| index.get(&t).map(|&j| (j, inf)))
                    .collect()
            })
            .collect();
        Self { ids, index, adj }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn id(&self, idx: usize) -> NodeId {
        self.ids[idx]
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    pub fn edges_ref(&self, idx: usize) -> &[(usize, Influence)] {
        &self.adj[idx]
    }
}

#[cfg(feature = "petgraph")]
impl<N, Ix> InfluenceGraph for petgraph::Graph<N, Influence, petgraph::Directed, Ix>
where
    Ix: petgraph::graph::IndexType,
{
    fn nodes(&self) -> Vec<NodeId> {
        self.node_indices().map(|n| n.index() as NodeId).collect()
    }
    fn out_edges(&self, node: NodeId) -> Vec<(NodeId, Influence)> {
        use petgraph::visit::EdgeRef;
        // Check before narrowing: a small `Ix` would wrap onto another node.
        if node >= self.node_count() as u64 {
            return Vec::new();
        }
        let idx = petgraph::graph::NodeIndex::<Ix>::new(node as usize);
        let mut out: Vec<(NodeId, Influence)> = self
            .edges(idx)
            .map(|e| (e.target().index() as NodeId, *e.weight()))
            .collect();
        // petgraph yields newest edge first; keep insertion order.
        out.reverse();
        out
    }
}
