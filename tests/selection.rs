use std::collections::HashSet;

use pmc::{
    Bfs, EdgeListGraph, GraphSnapshot, Influence, InfluenceGraph, NodeId, PmcConfig, PmcSelector,
    Round, SampleMode, Sampler,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn build_graph(n: u64, edges: &[(u64, u64, f64)]) -> EdgeListGraph {
    let mut g = EdgeListGraph::new();
    for v in 0..n {
        g.add_node(v);
    }
    if n > 0 {
        for &(u, v, p) in edges {
            g.add_edge(u % n, v % n, Influence::Fixed(p));
        }
    }
    g
}

fn arb_graph() -> impl Strategy<Value = EdgeListGraph> {
    (0u64..24, prop::collection::vec((0u64..64, 0u64..64, 0.0f64..=1.0), 0..72))
        .prop_map(|(n, edges)| build_graph(n, &edges))
}

fn round<'g>(snapshot: &'g GraphSnapshot, seed: u64) -> Round<'g> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Round::build(snapshot, &Sampler::default(), &HashSet::new(), &mut rng)
}

/// Reach count by plain BFS on the round's current reduced graph.
fn plain_reach(r: &Round<'_>, c: usize) -> f64 {
    let mut bfs = Bfs::new();
    let mut total = 0.0;
    bfs.walk(r.dag(), c, |u| {
        total += r.members(u).count() as f64;
        true
    });
    total
}

fn selector(rounds: usize, seed: u64) -> PmcSelector {
    PmcSelector::new(PmcConfig { rounds, seed }).unwrap()
}

proptest! {
    #[test]
    fn components_partition_the_sample(g in arb_graph(), seed in any::<u64>()) {
        let s = GraphSnapshot::new(&g);
        let r = round(&s, seed);

        let mut seen: HashSet<NodeId> = HashSet::new();
        for c in 0..r.component_count() {
            for v in r.members(c) {
                prop_assert!(seen.insert(v), "node {v} in two components");
                prop_assert_eq!(r.component_of(v), Some(c));
            }
        }
        let all: HashSet<NodeId> = g.nodes().into_iter().collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn reduced_graph_is_acyclic(g in arb_graph(), seed in any::<u64>()) {
        let s = GraphSnapshot::new(&g);
        let r = round(&s, seed);
        prop_assert!(r.dag().topological_order().is_some());
    }

    #[test]
    fn pivot_split_is_disjoint(g in arb_graph(), seed in any::<u64>()) {
        let s = GraphSnapshot::new(&g);
        let r = round(&s, seed);
        let a: HashSet<usize> = r.ancestors().iter().copied().collect();
        let d: HashSet<usize> = r.descendants().iter().copied().collect();
        prop_assert!(a.is_disjoint(&d));
        if let Some(h) = r.pivot() {
            prop_assert!(!a.contains(&h) && !d.contains(&h));
        } else {
            prop_assert!(a.is_empty() && d.is_empty());
        }
    }

    #[test]
    fn gains_match_plain_reach_and_are_idempotent(g in arb_graph(), seed in any::<u64>()) {
        let s = GraphSnapshot::new(&g);
        let mut r = round(&s, seed);
        let none = HashSet::new();
        for v in g.nodes() {
            let first = r.gain(v, &none);
            let second = r.gain(v, &none);
            prop_assert_eq!(first, second);
            let c = r.component_of(v).unwrap();
            prop_assert_eq!(first, plain_reach(&r, c), "node {}", v);
        }
    }

    #[test]
    fn update_shrinks_by_removed_count_and_keeps_cache_honest(
        g in arb_graph(),
        seed in any::<u64>(),
        pick in any::<prop::sample::Index>(),
    ) {
        let nodes = g.nodes();
        prop_assume!(!nodes.is_empty());
        let t = nodes[pick.index(nodes.len())];

        let s = GraphSnapshot::new(&g);
        let mut r = round(&s, seed);
        let none = HashSet::new();
        for &v in &nodes {
            r.gain(v, &none);
        }

        let c = r.component_of(t).unwrap();
        let mut expected = vec![c];
        Bfs::new().collect(r.dag(), c, &mut expected);

        let before = r.dag().node_count();
        let removed = r.update(t);
        prop_assert_eq!(removed, expected.len());
        prop_assert_eq!(r.dag().node_count(), before - removed);
        for &d in &expected {
            prop_assert!(!r.dag().contains(d));
        }

        // Whatever stayed cached must still be the true reach.
        let seeds: HashSet<NodeId> = [t].into_iter().collect();
        for &v in &nodes {
            let cv = r.component_of(v).unwrap();
            let got = r.gain(v, &seeds);
            let want = if r.dag().contains(cv) { plain_reach(&r, cv) } else { 0.0 };
            prop_assert_eq!(got, want, "node {}", v);
        }
    }

    #[test]
    fn selection_is_deterministic(g in arb_graph(), seed in any::<u64>(), k in 0usize..6) {
        let sel = selector(6, seed);
        let a = sel.select_detailed(&g, &Sampler::default(), &HashSet::new(), k);
        let b = sel.select_detailed(&g, &Sampler::default(), &HashSet::new(), k);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn activated_nodes_are_never_selected(
        g in arb_graph(),
        seed in any::<u64>(),
        mask in any::<u32>(),
        k in 0usize..30,
    ) {
        let nodes = g.nodes();
        let activated: HashSet<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&v| mask & (1 << (v % 32)) != 0)
            .collect();
        let eligible = nodes.len() - activated.len();

        let seeds = selector(3, seed).select(&g, &Sampler::default(), &activated, k);
        prop_assert_eq!(seeds.len(), k.min(eligible));
        let distinct: HashSet<NodeId> = seeds.iter().copied().collect();
        prop_assert_eq!(distinct.len(), seeds.len());
        for v in &seeds {
            prop_assert!(!activated.contains(v));
        }
    }
}

#[test]
fn star_center_wins_single_round() {
    for center in [0u64, 7, 1_000] {
        let mut g = EdgeListGraph::new();
        for leaf in (1..=12).filter(|&l| l != center) {
            g.add_edge(center, leaf, Influence::Fixed(1.0));
        }
        let seeds = selector(1, 0).select(&g, &Sampler::default(), &HashSet::new(), 1);
        assert_eq!(seeds, vec![center]);
    }
}

#[test]
fn empty_inputs_give_empty_selection() {
    let empty = EdgeListGraph::new();
    let sel = selector(4, 1);
    assert!(sel.select(&empty, &Sampler::default(), &HashSet::new(), 3).is_empty());

    let g = build_graph(5, &[(0, 1, 1.0), (1, 2, 1.0)]);
    assert!(sel.select(&g, &Sampler::default(), &HashSet::new(), 0).is_empty());
}

#[test]
fn activated_relays_do_not_count() {
    // 0 -> 1 -> 2 -> 3 with 1 already active: 0 reaches 0, 2, 3.
    let g = build_graph(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
    let activated: HashSet<NodeId> = [1].into_iter().collect();
    let sel = selector(2, 9).select_detailed(&g, &Sampler::default(), &activated, 1);
    assert_eq!(sel.seeds, vec![0]);
    assert_eq!(sel.gains, vec![3.0]);
}

#[test]
fn spread_estimate_tracks_edge_probability() {
    // 0 -> 1 with p = 0.3: spread of {0} is 1.3 in expectation.
    let g = build_graph(2, &[(0, 1, 0.3)]);
    let sel = selector(4_000, 11).select_detailed(&g, &Sampler::default(), &HashSet::new(), 1);
    assert_eq!(sel.seeds, vec![0]);
    let spread = sel.estimated_spread();
    assert!((spread - 1.3).abs() < 0.05, "spread={spread}");
}

#[test]
fn optimistic_mode_prefers_uncertain_edges() {
    // Two candidate hubs with the same mean (0.2): one certain, one a vague belief.
    let mut g = EdgeListGraph::new();
    for leaf in 1..=6 {
        g.add_edge(0, leaf, Influence::Fixed(0.2));
        g.add_edge(100, 100 + leaf, Influence::Beta { alpha: 1.0, beta: 4.0 });
    }
    let sel = selector(500, 5);
    let mean = sel.select_detailed(&g, &Sampler::new(SampleMode::Mean), &HashSet::new(), 1);
    let upper = sel.select_detailed(&g, &Sampler::new(SampleMode::Upper(2.0)), &HashSet::new(), 1);
    assert_eq!(upper.seeds, vec![100]);
    assert!(upper.estimated_spread() > mean.estimated_spread());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_is_thread_count_invariant() {
    let mut edges = Vec::new();
    for u in 0..40u64 {
        edges.push((u, (u * 7 + 3) % 40, 0.4));
        edges.push((u, (u * 13 + 1) % 40, 0.6));
    }
    let g = build_graph(40, &edges);
    let sel = selector(32, 2024);

    let pool1 = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let pool4 = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();

    let a = pool1.install(|| sel.select_detailed(&g, &Sampler::default(), &HashSet::new(), 5));
    let b = pool4.install(|| sel.select_detailed(&g, &Sampler::default(), &HashSet::new(), 5));
    assert_eq!(a, b, "parallel selection must be thread-count invariant");
}
