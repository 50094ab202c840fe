//! Greedy seed selection over `R` pruned Monte-Carlo rounds.

use std::cmp::Reverse;
use std::collections::HashSet;

use ordered_float::NotNan;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::PmcError;
use crate::graph::{GraphSnapshot, InfluenceGraph, NodeId};
use crate::influence::Sampler;
use crate::round::Round;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PmcConfig {
    /// Number of live-edge samples (`R`).
    pub rounds: usize,
    /// Seed for the per-round generators.
    pub seed: u64,
}

impl Default for PmcConfig {
    fn default() -> Self {
        Self { rounds: 200, seed: 42 }
    }
}

/// Seeds in pick order, with the average marginal gain each one added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub seeds: Vec<NodeId>,
    pub gains: Vec<f64>,
}

impl Selection {
    /// Expected spread of the whole seed set, as estimated by the rounds.
    pub fn estimated_spread(&self) -> f64 {
        self.gains.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub struct PmcSelector {
    config: PmcConfig,
}

impl PmcSelector {
    pub fn new(config: PmcConfig) -> Result<Self, PmcError> {
        if config.rounds == 0 {
            return Err(PmcError::ZeroRounds);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PmcConfig {
        &self.config
    }

    /// Pick up to `k` seeds maximizing estimated spread.
    ///
    /// Nodes in `activated` are never picked and never counted. Fewer than
    /// `k` seeds come back when the eligible nodes run out.
    pub fn select<G: InfluenceGraph + ?Sized>(
        &self,
        graph: &G,
        sampler: &Sampler,
        activated: &HashSet<NodeId>,
        k: usize,
    ) -> Vec<NodeId> {
        self.select_detailed(graph, sampler, activated, k).seeds
    }

    pub fn select_detailed<G: InfluenceGraph + ?Sized>(
        &self,
        graph: &G,
        sampler: &Sampler,
        activated: &HashSet<NodeId>,
        k: usize,
    ) -> Selection {
        let mut selection = Selection::default();
        if k == 0 {
            return selection;
        }

        let snapshot = GraphSnapshot::new(graph);
        let mut rounds = self.build_rounds(&snapshot, sampler, activated);
        let r = rounds.len() as f64;
        let mut chosen: HashSet<NodeId> = HashSet::new();

        while selection.seeds.len() < k {
            let candidates: Vec<NodeId> = snapshot
                .ids()
                .iter()
                .copied()
                .filter(|v| !activated.contains(v) && !chosen.contains(v))
                .collect();
            if candidates.is_empty() {
                tracing::debug!(picked = selection.seeds.len(), k, "no eligible candidates left");
                break;
            }

            let totals = scan(&mut rounds, &candidates, &chosen);
            // Highest average wins; on ties the earliest candidate.
            let best = candidates
                .iter()
                .zip(&totals)
                .enumerate()
                .filter_map(|(pos, (&v, &total))| {
                    NotNan::new(total / r).ok().map(|avg| (avg, Reverse(pos), v))
                })
                .max_by_key(|&(avg, pos, _)| (avg, pos));
            let Some((avg, _, t)) = best else {
                break;
            };

            tracing::debug!(node = t, gain = avg.into_inner(), "picked seed");
            chosen.insert(t);
            selection.seeds.push(t);
            selection.gains.push(avg.into_inner());
            prune(&mut rounds, t);
        }

        selection
    }

    /// Sample and contract every round.
    ///
    /// Round `i` draws from its own generator seeded by `(seed, i)`, so the
    /// rounds are the same whichever order (or thread) builds them.
    pub fn build_rounds<'g>(
        &self,
        snapshot: &'g GraphSnapshot,
        sampler: &Sampler,
        activated: &HashSet<NodeId>,
    ) -> Vec<Round<'g>> {
        let seed = self.config.seed;
        let build = |i: usize| {
            let mut rng = round_rng(seed, i);
            Round::build(snapshot, sampler, activated, &mut rng)
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..self.config.rounds).into_par_iter().map(build).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.config.rounds).map(build).collect()
        }
    }
}

/// Per-candidate gain totals, summed in round order.
#[cfg(not(feature = "parallel"))]
fn scan(rounds: &mut [Round<'_>], candidates: &[NodeId], chosen: &HashSet<NodeId>) -> Vec<f64> {
    let mut totals = vec![0.0f64; candidates.len()];
    for round in rounds.iter_mut() {
        for (total, &v) in totals.iter_mut().zip(candidates) {
            *total += round.gain(v, chosen);
        }
    }
    totals
}

/// Per-candidate gain totals, summed in round order.
///
/// Rounds are scanned in parallel; the per-round vectors are folded in round
/// order so the sums match the sequential path bit for bit.
#[cfg(feature = "parallel")]
fn scan(rounds: &mut [Round<'_>], candidates: &[NodeId], chosen: &HashSet<NodeId>) -> Vec<f64> {
    use rayon::prelude::*;

    let per_round: Vec<Vec<f64>> = rounds
        .par_iter_mut()
        .map(|round| candidates.iter().map(|&v| round.gain(v, chosen)).collect())
        .collect();

    let mut totals = vec![0.0f64; candidates.len()];
    for gains in &per_round {
        for (total, g) in totals.iter_mut().zip(gains) {
            *total += g;
        }
    }
    totals
}

#[cfg(not(feature = "parallel"))]
fn prune(rounds: &mut [Round<'_>], node: NodeId) {
    for round in rounds.iter_mut() {
        round.update(node);
    }
}

#[cfg(feature = "parallel")]
fn prune(rounds: &mut [Round<'_>], node: NodeId) {
    use rayon::prelude::*;
    rounds.par_iter_mut().for_each(|round| {
        round.update(node);
    });
}

fn round_rng(seed: u64, round: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix64(seed ^ round as u64))
}

/// SplitMix64 finalizer; spreads nearby round seeds apart.
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeListGraph;
    use crate::influence::Influence;

    fn star(center: NodeId, leaves: impl IntoIterator<Item = NodeId>) -> EdgeListGraph {
        let mut g = EdgeListGraph::new();
        for leaf in leaves {
            g.add_edge(center, leaf, Influence::Fixed(1.0));
        }
        g
    }

    fn selector(rounds: usize) -> PmcSelector {
        PmcSelector::new(PmcConfig { rounds, seed: 3 }).unwrap()
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let err = PmcSelector::new(PmcConfig { rounds: 0, seed: 0 }).unwrap_err();
        assert!(matches!(err, PmcError::ZeroRounds));
    }

    #[test]
    fn star_center_is_picked_wherever_it_sorts() {
        for center in [0, 5, 100] {
            let g = star(center, (1..=10).filter(|&leaf| leaf != center));
            let seeds = selector(1).select(&g, &Sampler::default(), &HashSet::new(), 1);
            assert_eq!(seeds, vec![center], "center={center}");
        }
    }

    #[test]
    fn gains_sum_to_spread_on_certain_edges() {
        // Two disjoint stars: {0 -> 1..=3} and {10 -> 11..=12}
        let mut g = star(0, 1..=3);
        for leaf in 11..=12 {
            g.add_edge(10, leaf, Influence::Fixed(1.0));
        }
        let sel = selector(4).select_detailed(&g, &Sampler::default(), &HashSet::new(), 2);
        assert_eq!(sel.seeds, vec![0, 10]);
        assert_eq!(sel.gains, vec![4.0, 3.0]);
        assert_eq!(sel.estimated_spread(), 7.0);
    }

    #[test]
    fn runs_out_of_candidates_without_looping() {
        let g = star(0, 1..=2);
        let activated: HashSet<NodeId> = [1].into_iter().collect();
        let seeds = selector(2).select(&g, &Sampler::default(), &activated, 10);
        assert_eq!(seeds.len(), 2);
        assert!(!seeds.contains(&1));
    }

    #[test]
    fn zero_gain_candidates_still_fill_k() {
        // After the chain head is picked, everything else has gain 0.
        let mut g = EdgeListGraph::new();
        g.add_edge(0, 1, Influence::Fixed(1.0));
        g.add_edge(1, 2, Influence::Fixed(1.0));
        let sel = selector(1).select_detailed(&g, &Sampler::default(), &HashSet::new(), 3);
        assert_eq!(sel.seeds, vec![0, 1, 2]);
        assert_eq!(sel.gains, vec![3.0, 0.0, 0.0]);
    }

    #[test]
    fn mix64_spreads_adjacent_inputs() {
        assert_ne!(mix64(0) & 0xffff, mix64(1) & 0xffff);
        assert_eq!(mix64(12345), mix64(12345));
    }
}
