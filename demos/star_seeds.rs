//! End-to-end sketch: load (or generate) an influence graph, pick seeds.
//!
//! Runs the same selection twice: once against posterior means and once
//! optimistically (`mean + 2 sd`), the way an explore/exploit driver would
//! alternate between them. With fixed probabilities both agree.
//!
//! ```text
//! PMC_EDGELIST=/path/to/edges.txt PMC_K=10 cargo run --example star_seeds
//! ```
//!
//! Edge-list format: `src tgt prob` per line, `#` comments allowed.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pmc::{EdgeListGraph, Influence, InfluenceGraph, PmcConfig, PmcSelector, SampleMode, Sampler};

/// A few stars of different sizes joined by weak random links, with Beta
/// beliefs so the two sampling modes can disagree.
fn linked_stars(stars: u64, seed: u64) -> EdgeListGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut g = EdgeListGraph::new();
    let mut next = stars;
    for hub in 0..stars {
        let leaves = 3 + 4 * hub;
        // Bigger stars are less certain: fewer observations behind the same mean.
        let evidence = 40.0 / (hub + 1) as f64;
        for _ in 0..leaves {
            g.add_edge(
                hub,
                next,
                Influence::Beta { alpha: 0.3 * evidence, beta: 0.7 * evidence },
            );
            next += 1;
        }
    }
    for _ in 0..stars * 4 {
        let u = rng.random_range(0..next);
        let v = rng.random_range(0..next);
        if u != v {
            g.add_edge(u, v, Influence::Fixed(0.05));
        }
    }
    g
}

fn main() -> Result<(), pmc::PmcError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let g = match std::env::var("PMC_EDGELIST") {
        Ok(path) => EdgeListGraph::from_edge_list(BufReader::new(File::open(path)?))?,
        Err(_) => linked_stars(6, 123),
    };
    let k: usize = std::env::var("PMC_K").ok().and_then(|s| s.parse().ok()).unwrap_or(3);

    let selector = PmcSelector::new(PmcConfig { rounds: 200, seed: 9 })?;
    let activated = HashSet::new();

    println!("graph: n={}, m={}, k={k}", g.node_count(), g.edge_count());
    for (label, mode) in [("mean", SampleMode::Mean), ("upper", SampleMode::Upper(2.0))] {
        let sel = selector.select_detailed(&g, &Sampler::new(mode), &activated, k);
        println!();
        println!("{label}: estimated spread {:.2}", sel.estimated_spread());
        for (seed, gain) in sel.seeds.iter().zip(&sel.gains) {
            println!("  node {seed:6}  out_degree={:3}  gain={gain:.3}", g.out_degree(*seed));
        }
    }
    Ok(())
}
