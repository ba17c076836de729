/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::{concurrent_progress_logger, progress_logger};
use predicates::prelude::*;
use prgraph::graphs::csr_graph::CsrGraph;
use prgraph::graphs::random::ErdosRenyi;
use prgraph::graphs::vec_graph::VecGraph;
use prgraph::traits::PredecessorGraph;
use prgraph_algo::rank::pagerank::{PageRank, preds, solve, solve_into};
use prgraph_algo::utils::thread_pool;

/// Returns the 𝓁-∞ distance (maximum absolute difference) between two vectors.
fn l_inf_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// A plain sequential power method, iterated until successive approximations
/// coincide up to rounding.
fn power_method(g: &impl PredecessorGraph, alpha: f64) -> Vec<f64> {
    let n = g.num_nodes();
    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..10_000 {
        let dangling: f64 = (0..n).filter(|&j| g.outdegree(j) == 0).map(|j| x[j]).sum();
        let y: Vec<f64> = (0..n)
            .map(|i| {
                let sigma: f64 = g
                    .predecessors(i)
                    .into_iter()
                    .map(|j| x[j] / g.outdegree(j) as f64)
                    .sum();
                alpha * sigma + (1.0 - alpha) / n as f64 + alpha * dangling / n as f64
            })
            .collect();
        let delta = l_inf_distance(&x, &y);
        x = y;
        if delta < 1E-16 {
            break;
        }
    }
    x
}

/// Returns an Erdös-Rényi graph followed by `isolated` dangling nodes.
fn random_graph(n: usize, p: f64, seed: u64, isolated: usize) -> VecGraph {
    let mut g = VecGraph::empty(n + isolated);
    g.add_arcs(ErdosRenyi::new(n, p, seed).arcs());
    g
}

/// A star with `k` leaves pointing to the hub 0.
fn star(k: usize, hub_loop: bool) -> VecGraph {
    let mut g = VecGraph::empty(k + 1);
    if hub_loop {
        g.add_arc(0, 0);
    }
    for leaf in 1..=k {
        g.add_arc(leaf, 0);
    }
    g
}

#[test]
fn test_empty() -> Result<()> {
    let g = VecGraph::empty(0);
    let mut pr = PageRank::new(&g);
    pr.run(preds::L1Norm::try_from(1E-15)?);
    assert!(pr.rank().is_empty());
    assert_eq!(pr.iterations(), 0);
    assert!(solve(&g, 0.85, 1E-6)?.is_empty());
    Ok(())
}

#[test]
fn test_single_node() -> Result<()> {
    let g = VecGraph::empty(1);
    let mut pr = PageRank::new(&g);
    pr.run(preds::L1Norm::default());
    assert_eq!(pr.iterations(), 1);
    assert_eq!(pr.num_dangling(), 1);
    assert!((pr.rank()[0] - 1.0).abs() < 1E-15);
    assert!(pr.norm_delta() < 1E-15);
    Ok(())
}

#[test]
fn test_two_cycle() -> Result<()> {
    let g = VecGraph::from_arcs([(0, 1), (1, 0)]);
    for alpha in [0.1, 0.5, 0.85, 0.99] {
        let rank = solve(&g, alpha, 1E-9)?;
        assert!(l_inf_distance(&rank, &[0.5, 0.5]) < 1E-15, "{rank:?}");
    }
    Ok(())
}

#[test]
fn test_all_dangling() -> Result<()> {
    for n in [2, 10, 1000] {
        let g = VecGraph::empty(n);
        let mut pr = PageRank::new(&g);
        pr.alpha(0.5);
        pr.run(preds::L1Norm::try_from(1E-9)?);
        assert_eq!(pr.iterations(), 1);
        assert_eq!(pr.num_dangling(), n);
        let expected = vec![1.0 / n as f64; n];
        assert!(l_inf_distance(pr.rank(), &expected) < 1E-15);
    }
    Ok(())
}

/// When the hub is dangling its rank is redistributed to all nodes, so leaves
/// receive more than the teleportation share.
#[test]
fn test_star_dangling_hub() -> Result<()> {
    for k in [1, 5, 100] {
        let g = star(k, false);
        let n = (k + 1) as f64;
        for alpha in [0.25, 0.5, 0.85] {
            let rank = solve(&g, alpha, 1E-13)?;
            let leaf = 1.0 / (n + alpha * k as f64);
            let hub = (1.0 + alpha * k as f64) / (n + alpha * k as f64);
            assert!((rank[0] - hub).abs() < 1E-11, "k={k} alpha={alpha}");
            for &r in &rank[1..] {
                assert!((r - leaf).abs() < 1E-11, "k={k} alpha={alpha}");
            }
        }
    }
    Ok(())
}

/// With a loop on the hub there are no dangling nodes, and leaves receive
/// exactly the teleportation share.
#[test]
fn test_star_looping_hub() -> Result<()> {
    for k in [1, 5, 100] {
        let g = star(k, true);
        let n = (k + 1) as f64;
        for alpha in [0.25, 0.5, 0.85] {
            let mut pr = PageRank::new(&g);
            pr.alpha(alpha);
            pr.run(preds::L1Norm::try_from(1E-13)?);
            assert_eq!(pr.num_dangling(), 0);
            let leaf = (1.0 - alpha) / n;
            for &r in &pr.rank()[1..] {
                assert!((r - leaf).abs() < 1E-15, "k={k} alpha={alpha}");
            }
            assert!((pr.rank()[0] - (1.0 - k as f64 * leaf)).abs() < 1E-11);
        }
    }
    Ok(())
}

#[test]
fn test_mass_conservation() -> Result<()> {
    let g = random_graph(200, 0.02, 0, 20);
    for k in 1..=10 {
        let mut pr = PageRank::new(&g);
        pr.run(preds::MaxIter::from(k));
        assert_eq!(pr.iterations(), k);
        assert!(pr.num_dangling() >= 20);
        assert!((pr.mass() - 1.0).abs() < 1E-12, "mass {}", pr.mass());
        let sum: f64 = pr.rank().iter().sum();
        assert!((sum - 1.0).abs() < 1E-12, "sum {sum}");
        assert!(pr.rank().iter().all(|&r| r > 0.0));
    }
    Ok(())
}

#[test]
fn test_norm_delta_decreases() -> Result<()> {
    let g = random_graph(300, 0.01, 1, 10);
    let alpha = 0.85;
    let mut last = f64::INFINITY;
    for k in 1..=20 {
        let mut pr = PageRank::new(&g);
        pr.alpha(alpha);
        pr.run(preds::MaxIter::from(k));
        // The iteration is a contraction of factor alpha in 𝓁₁
        assert!(pr.norm_delta() <= alpha * last + 1E-15);
        last = pr.norm_delta();
    }
    Ok(())
}

#[test]
fn test_against_power_method() -> Result<()> {
    for (n, p, seed) in [(10, 0.3, 0), (100, 0.05, 1), (500, 0.005, 2)] {
        let g = random_graph(n, p, seed, 3);
        let csr = CsrGraph::from_graph(&g);
        for alpha in [0.5, 0.85, 0.95] {
            let expected = power_method(&g, alpha);
            let rank = solve(&g, alpha, 1E-12)?;
            assert!(
                l_inf_distance(&rank, &expected) < 1E-10,
                "n={n} alpha={alpha}: L∞={}",
                l_inf_distance(&rank, &expected)
            );
            let csr_rank = solve(&csr, alpha, 1E-12)?;
            assert!(l_inf_distance(&rank, &csr_rank) < 1E-12);
        }
    }
    Ok(())
}

#[test]
fn test_thread_independence() -> Result<()> {
    let g = ErdosRenyi::new(1000, 0.005, 3).to_csr_graph();
    let reference = thread_pool(Some(1))?.install(|| solve(&g, 0.85, 1E-12))?;
    for num_threads in [2, 3, 8] {
        let rank = thread_pool(Some(num_threads))?.install(|| solve(&g, 0.85, 1E-12))?;
        assert!(
            l_inf_distance(&rank, &reference) < 1E-10,
            "{num_threads} threads"
        );
    }
    Ok(())
}

#[test]
fn test_more_threads_than_nodes() -> Result<()> {
    let g = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0)]);
    let rank = thread_pool(Some(8))?.install(|| solve(&g, 0.85, 1E-12))?;
    assert!(l_inf_distance(&rank, &[1.0 / 3.0; 3]) < 1E-15);
    Ok(())
}

#[test]
fn test_combined_predicates() -> Result<()> {
    let g = random_graph(100, 0.05, 4, 0);
    let mut pr = PageRank::new(&g);
    pr.run(preds::L1Norm::try_from(1E-300)?.or(preds::MaxIter::from(5)));
    assert_eq!(pr.iterations(), 5);

    let mut pr = PageRank::new(&g);
    pr.run(
        preds::L1Norm::try_from(1E-3)?
            .boxed()
            .or(preds::MaxIter::from(1000))
            .boxed(),
    );
    assert!(pr.iterations() < 1000);
    assert!(pr.norm_delta() < 1E-3);
    Ok(())
}

#[test]
fn test_rerun() -> Result<()> {
    let g = random_graph(100, 0.05, 5, 5);
    let mut pr = PageRank::new(&g);
    pr.run(preds::L1Norm::try_from(1E-12)?);
    let first = pr.rank().to_vec();
    let iterations = pr.iterations();

    // Inverse outdegrees are reused, and the computation restarts from scratch
    pr.run(preds::L1Norm::try_from(1E-12)?);
    assert_eq!(pr.iterations(), iterations);
    assert!(l_inf_distance(pr.rank(), &first) < 1E-15);

    pr.alpha(0.5);
    pr.run(preds::L1Norm::try_from(1E-12)?);
    assert!(l_inf_distance(pr.rank(), &power_method(&g, 0.5)) < 1E-10);
    Ok(())
}

#[test]
fn test_solve_into() -> Result<()> {
    let g = random_graph(50, 0.1, 6, 2);
    let mut solution = vec![f64::NAN; g.num_nodes()];
    solve_into(&g, 0.85, 1E-12, &mut solution)?;
    assert_eq!(&*solve(&g, 0.85, 1E-12)?, solution.as_slice());

    let mut pr = PageRank::new(&g);
    pr.run(preds::L1Norm::try_from(1E-12)?);
    let mut copy = vec![0.0; g.num_nodes()];
    pr.copy_rank_to(&mut copy);
    assert_eq!(copy, pr.into_rank().to_vec());
    Ok(())
}

#[test]
#[should_panic(expected = "does not match the number of nodes")]
fn test_solve_into_wrong_length() {
    let g = VecGraph::empty(3);
    let mut solution = vec![0.0; 2];
    let _ = solve_into(&g, 0.85, 1E-6, &mut solution);
}

#[test]
fn test_bad_threshold() {
    let g = VecGraph::empty(3);
    assert!(solve(&g, 0.85, 0.0).is_err());
    assert!(solve(&g, 0.85, -1.0).is_err());
    assert!(solve(&g, 0.85, f64::NAN).is_err());
}

#[test]
#[should_panic(expected = "The damping factor must be in (0 . . 1)")]
fn test_bad_alpha() {
    let g = VecGraph::empty(3);
    PageRank::new(&g).alpha(1.0);
}

#[test]
#[should_panic(expected = "The damping factor must be in (0 . . 1)")]
fn test_zero_alpha() {
    let g = VecGraph::empty(3);
    PageRank::new(&g).alpha(0.0);
}

#[test]
fn test_logging() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
    let g = random_graph(100, 0.05, 7, 5);
    let mut pl = progress_logger![];
    let mut cpl = concurrent_progress_logger![];
    let mut pr = PageRank::new(&g);
    pr.run_with_logging(preds::L1Norm::try_from(1E-12)?, &mut pl, &mut cpl);
    assert!(l_inf_distance(pr.rank(), &power_method(&g, 0.85)) < 1E-10);
    Ok(())
}

#[cfg_attr(feature = "slow_tests", test)]
#[cfg_attr(not(feature = "slow_tests"), allow(dead_code))]
fn test_large() -> Result<()> {
    let g = ErdosRenyi::new(20_000, 0.0005, 8).to_csr_graph();
    let reference = power_method(&g, 0.85);
    for num_threads in [1, 4, 16] {
        let rank = thread_pool(Some(num_threads))?.install(|| solve(&g, 0.85, 1E-12))?;
        assert!(l_inf_distance(&rank, &reference) < 1E-10);
        assert!((rank.iter().sum::<f64>() - 1.0).abs() < 1E-10);
    }
    Ok(())
}
