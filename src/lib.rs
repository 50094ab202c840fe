//! # pmc
//!
//! Influence maximization by pruned Monte-Carlo simulation.
//!
//! Given a directed graph whose edges carry activation probabilities, pick
//! `k` seed nodes whose expected cascade (independent-cascade model) is as
//! large as possible. Each of `R` rounds samples a live-edge subgraph and
//! contracts its strongly connected components in the same DFS; greedy
//! selection then works on the reduced DAGs, memoizing per-component reach
//! and pruning whatever a chosen seed already covers.
//!
//! ```
//! use std::collections::HashSet;
//! use pmc::{EdgeListGraph, Influence, PmcConfig, PmcSelector, Sampler};
//!
//! let mut g = EdgeListGraph::new();
//! for leaf in 1..=5 {
//!     g.add_edge(0, leaf, Influence::Fixed(1.0));
//! }
//! let selector = PmcSelector::new(PmcConfig { rounds: 8, seed: 1 }).unwrap();
//! let seeds = selector.select(&g, &Sampler::default(), &HashSet::new(), 1);
//! assert_eq!(seeds, vec![0]);
//! ```

pub mod contract;
pub mod dag;
pub mod error;
pub mod graph;
pub mod influence;
pub mod reachability;
pub mod round;
pub mod select;

pub use contract::{contract, Contraction};
pub use dag::ReducedGraph;
pub use error::PmcError;
pub use graph::{EdgeListGraph, GraphSnapshot, InfluenceGraph, NodeId};
pub use influence::{Influence, SampleMode, Sampler};
pub use reachability::{pivot_partition, Bfs};
pub use round::Round;
pub use select::{PmcConfig, PmcSelector, Selection};
