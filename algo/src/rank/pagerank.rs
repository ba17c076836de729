/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Parallel Jacobi PageRank with strided work distribution.
//!
//! This implementation uses two vectors of doubles for the rank (the _active_
//! one, containing the current approximation, and the _staging_ one, receiving
//! the next approximation) and a third one for the inverses of outdegrees.
//!
//! The graph is accessed through its predecessors, as each node _pulls_ rank
//! from the nodes pointing to it: see
//! [`PredecessorGraph`](prgraph::traits::PredecessorGraph).
//!
//! # The formula
//!
//! If we denote with *P* the row-normalized adjacency matrix of the graph
//! (with zero rows for dangling nodes), with **d** the characteristic vector of
//! dangling nodes, with *n* the number of nodes, and with α the damping
//! factor, PageRank is the unique stochastic solution of
//!
//! > **x** = **x** ( α *P*  +  α **d**ᵀ **1** / *n*  +  (1 − α) **1**ᵀ **1** / *n* ),
//!
//! that is, a random surfer follows a random outgoing arc with probability α
//! and jumps to a uniformly chosen node otherwise; a surfer on a dangling
//! node always jumps uniformly. The rank of dangling nodes is thus
//! redistributed uniformly to all nodes.
//!
//! # The iteration
//!
//! We apply the Jacobi method (i.e., the power method) to the equation above:
//!
//! 1. initialize **x** to the uniform vector 1/*n*;
//! 2. compute the _dangling rank_ *D*, the sum of *xⱼ* over dangling *j*;
//! 3. for each *i* = 0, 1, …, *n* − 1:
//!    - σ = ∑ over *j* → *i* of *xⱼ* / *d*⁺(*j*);
//!    - *yᵢ* = α σ + (1 − α) / *n* + α *D* / *n*;
//! 4. compute the norm delta ‖**y** − **x**‖₁ and swap the roles of **x** and
//!    **y**;
//! 5. repeat from 2 until the stopping criterion is met.
//!
//! Each iteration conserves probability mass: the rank of a non-dangling node
//! flows entirely to its successors, the rank of a dangling node is spread
//! over all nodes, and the teleportation term adds back the (1 − α) share
//! that was not moved along arcs. The norm delta is non-increasing up to a
//! factor α at each iteration, so every positive threshold is eventually met.
//!
//! The dangling rank needed by the next iteration is accumulated while
//! computing the current one, so it costs no additional pass on the nodes.
//!
//! # Parallelism
//!
//! Every step is a fork-join region executed by all threads of the current
//! Rayon thread pool (see [`utils`](crate::utils)): worker *k* out of *T*
//! processes nodes *k*, *k* + *T*, *k* + 2*T*, …, writing their new rank in
//! the staging vector. Since each index is written by a single worker and the
//! active vector is only read, no locking is necessary. The norm delta, the
//! total mass, and the dangling rank are accumulated in per-worker
//! compensated sums that are [combined](crate::utils::Reduce) after the
//! region ends.
//!
//! The summation order depends on the number of threads, so results computed
//! with different thread pools coincide only up to the stopping threshold.
//!
//! # Stopping Criteria
//!
//! The [`run`](PageRank::run) method accepts a composable [`Predicate`] that
//! is evaluated after each iteration. The predicate receives the current
//! iteration number and the _norm delta_ ‖**x**⁽ᵗ⁾ − **x**⁽ᵗ⁻¹⁾‖₁ (the sum of
//! the absolute differences between successive approximations).

pub mod preds {
    //! Stopping rules for [`PageRank`](super::PageRank).
    //!
    //! After each iteration the solver builds a [`PredParams`] with the
    //! number of completed iterations and the raw Δ, the sum over all nodes
    //! of |*x*⁽ᵗ⁾ᵢ − *x*⁽ᵗ⁻¹⁾ᵢ|, and stops as soon as its predicate holds.
    //! Δ is compared as is, with no scaling by the damping factor.
    //!
    //! Rules compose with the `and`/`or` combinators of [`Predicate`]; for
    //! instance, a Δ bound can be capped with an iteration bound:
    //!
    //! ```
    //! # fn main() -> Result<(), Box<dyn std::error::Error>> {
    //! use predicates::prelude::*;
    //! use prgraph_algo::rank::pagerank::preds::{L1Norm, MaxIter};
    //!
    //! let capped = L1Norm::try_from(1E-10)?.or(MaxIter::from(100)).boxed();
    //! assert!(capped.to_string().contains("iterations ≥ 100"));
    //! #     Ok(())
    //! # }
    //! ```

    use anyhow::ensure;
    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::{self, Display};

    #[doc(hidden)]
    /// What the solver knows after an iteration.
    #[derive(Debug)]
    pub struct PredParams {
        pub iteration: usize,
        pub norm_delta: f64,
    }

    /// Holds once a given number of iterations has been completed.
    ///
    /// The default bound is [`usize::MAX`], that is, no bound.
    #[derive(Debug, Clone)]
    pub struct MaxIter {
        max_iter: usize,
    }

    impl MaxIter {
        pub const DEFAULT_MAX_ITER: usize = usize::MAX;
    }

    impl From<usize> for MaxIter {
        fn from(max_iter: usize) -> Self {
            MaxIter { max_iter }
        }
    }

    impl Default for MaxIter {
        fn default() -> Self {
            Self::from(Self::DEFAULT_MAX_ITER)
        }
    }

    impl Display for MaxIter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "iterations ≥ {}", self.max_iter)
        }
    }

    impl PredicateReflection for MaxIter {}

    impl Predicate<PredParams> for MaxIter {
        fn eval(&self, params: &PredParams) -> bool {
            params.iteration >= self.max_iter
        }
    }

    /// Holds when Δ, the 𝓁₁ distance between the last two rank vectors, is
    /// strictly smaller than a positive threshold.
    ///
    /// The threshold defaults to [`DEFAULT_THRESHOLD`](Self::DEFAULT_THRESHOLD).
    /// Building the rule from a NaN or non-positive threshold fails, as Δ
    /// would never go below it.
    #[derive(Debug, Clone)]
    pub struct L1Norm {
        threshold: f64,
    }

    impl L1Norm {
        pub const DEFAULT_THRESHOLD: f64 = 1E-6;
    }

    impl TryFrom<Option<f64>> for L1Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
            let Some(threshold) = threshold else {
                return Ok(Self::default());
            };
            ensure!(
                threshold > 0.0,
                "The Δ threshold must be a positive number, got {threshold}"
            );
            Ok(L1Norm { threshold })
        }
    }

    impl TryFrom<f64> for L1Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: f64) -> anyhow::Result<Self> {
            Self::try_from(Some(threshold))
        }
    }

    impl Default for L1Norm {
        fn default() -> Self {
            L1Norm {
                threshold: Self::DEFAULT_THRESHOLD,
            }
        }
    }

    impl Display for L1Norm {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Δ < {}", self.threshold)
        }
    }

    impl PredicateReflection for L1Norm {}

    impl Predicate<PredParams> for L1Norm {
        fn eval(&self, params: &PredParams) -> bool {
            params.norm_delta < self.threshold
        }
    }

}

use crate::utils::{
    CompensatedSum, Reduce, par_strided_fill, par_strided_map_reduce, par_strided_reduce,
};
use anyhow::Result;
use dsi_progress_logger::{ConcurrentProgressLog, ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;
use prgraph::traits::PredecessorGraph;

/// Sums accumulated by each worker during an iteration.
#[derive(Debug, Clone, Default)]
struct IterationSums {
    /// The sum of the absolute differences between new and old ranks.
    norm_delta: CompensatedSum,
    /// The sum of the new ranks.
    mass: CompensatedSum,
    /// The sum of the new ranks of dangling nodes.
    dangling_rank: CompensatedSum,
    /// The number of dangling nodes.
    num_dangling: usize,
}

impl Reduce for IterationSums {
    fn combine(self, other: Self) -> Self {
        Self {
            norm_delta: self.norm_delta.combine(other.norm_delta),
            mass: self.mass.combine(other.mass),
            dangling_rank: self.dangling_rank.combine(other.dangling_rank),
            num_dangling: self.num_dangling + other.num_dangling,
        }
    }
}

/// Computes PageRank using a parallel Jacobi iteration.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run). After completion the rank vector is available via the
/// [`rank`](Self::rank) method. The computation uses the threads of the
/// current Rayon thread pool: use
/// [`ThreadPool::install`](rayon::ThreadPool::install) to choose a different
/// pool.
///
/// If you just need the rank vector, [`solve`] is simpler.
///
/// # Examples
///
/// ```
/// use prgraph::graphs::vec_graph::VecGraph;
/// use prgraph_algo::rank::pagerank::{PageRank, preds};
///
/// // 0 → 1, 0 → 2, 1 → 2, 2 → 0, 3 → 0, 4 → 3
/// let g = VecGraph::from_arcs([(0, 1), (0, 2), (1, 2), (2, 0), (3, 0), (4, 3)]);
///
/// let mut pr = PageRank::new(&g);
/// pr.alpha(0.85);
/// pr.run(preds::L1Norm::try_from(1E-9).unwrap());
///
/// assert_eq!(pr.rank().len(), 5);
/// assert!((pr.rank().iter().sum::<f64>() - 1.0).abs() < 1E-9);
/// // Node 4 has no predecessors
/// assert!((pr.rank()[4] - 0.15 / 5.0).abs() < 1E-9);
/// ```
pub struct PageRank<'a, G: PredecessorGraph + Sync> {
    graph: &'a G,
    alpha: f64,
    inv_outdegrees: Option<Box<[f64]>>,
    num_dangling: usize,
    norm_delta: f64,
    mass: f64,

    /// The two rank vectors; `ranks[active]` is the current approximation.
    ranks: [Box<[f64]>; 2],
    active: usize,
    iteration: usize,
}

impl<G: PredecessorGraph + Sync> std::fmt::Debug for PageRank<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRank")
            .field("alpha", &self.alpha)
            .field("num_dangling", &self.num_dangling)
            .field("norm_delta", &self.norm_delta)
            .field("mass", &self.mass)
            .field("iteration", &self.iteration)
            .finish_non_exhaustive()
    }
}

impl<'a, G: PredecessorGraph + Sync> PageRank<'a, G> {
    pub const DEFAULT_ALPHA: f64 = 0.85;

    /// Creates a new PageRank computation on the given graph.
    pub fn new(graph: &'a G) -> Self {
        let n = graph.num_nodes();
        Self {
            graph,
            alpha: Self::DEFAULT_ALPHA,
            inv_outdegrees: None,
            num_dangling: 0,
            norm_delta: f64::INFINITY,
            mass: 0.0,
            ranks: [
                vec![0.0; n].into_boxed_slice(),
                vec![0.0; n].into_boxed_slice(),
            ],
            active: 0,
            iteration: 0,
        }
    }

    /// Sets the damping factor α.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not in the interval (0 . . 1).
    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        assert!(
            alpha > 0.0 && alpha < 1.0,
            "The damping factor must be in (0 . . 1), got {alpha}"
        );
        self.alpha = alpha;
        self
    }

    /// Returns the rank vector.
    ///
    /// After calling [`run`](Self::run), this contains the computed PageRank
    /// values.
    pub fn rank(&self) -> &[f64] {
        &self.ranks[self.active]
    }

    /// Consumes the computation and returns the rank vector.
    pub fn into_rank(self) -> Box<[f64]> {
        let [first, second] = self.ranks;
        if self.active == 0 { first } else { second }
    }

    /// Copies in parallel the rank vector into `solution`.
    ///
    /// # Panics
    ///
    /// Panics if the length of `solution` is not the number of nodes.
    pub fn copy_rank_to(&self, solution: &mut [f64]) {
        let rank = self.rank();
        assert_eq!(
            solution.len(),
            rank.len(),
            "Solution vector length ({}) does not match the number of nodes ({})",
            solution.len(),
            rank.len()
        );
        par_strided_fill(solution, |i| rank[i]);
    }

    /// Returns the number of iterations performed by the last call to
    /// [`run`](Self::run).
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Returns the norm delta after the last iteration, that is, the 𝓁₁ norm
    /// of the difference between the last two approximations.
    pub fn norm_delta(&self) -> f64 {
        self.norm_delta
    }

    /// Returns the sum of the entries of the rank vector, as computed during
    /// the last iteration.
    ///
    /// This value is one up to rounding errors.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Returns the number of dangling nodes found by the last call to
    /// [`run`](Self::run).
    pub fn num_dangling(&self) -> usize {
        self.num_dangling
    }

    /// Runs the PageRank computation until the given predicate is satisfied.
    pub fn run(&mut self, predicate: impl Predicate<preds::PredParams>) {
        self.run_with_logging(predicate, no_logging![], no_logging![]);
    }

    /// Runs the PageRank computation until the given predicate is satisfied,
    /// logging progress.
    ///
    /// `pl` is a sequential [`ProgressLog`] used for iteration counting. `cpl`
    /// is a [`ConcurrentProgressLog`] used for node-level progress inside each
    /// iteration. Their options will be preserved, making thus possible to
    /// customize the logs.
    ///
    /// It is possible to specify either `pl` or `cpl` as
    /// [`no_logging![]`](dsi_progress_logger::no_logging) if you don't want to log
    /// the corresponding part of the computation.
    pub fn run_with_logging(
        &mut self,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
        cpl: &mut impl ConcurrentProgressLog,
    ) {
        let graph = self.graph;
        let n = graph.num_nodes();
        self.iteration = 0;
        self.norm_delta = f64::INFINITY;
        self.active = 0;
        if n == 0 {
            self.mass = 0.0;
            return;
        }

        log::info!("Nodes: {}", n);
        log::info!("Arcs: {}", graph.num_arcs());
        log::info!("Alpha: {}", self.alpha);
        log::info!("Threads: {}", rayon::current_num_threads());
        log::info!("Stopping criterion: {}", predicate);

        let alpha = self.alpha;
        let inv_n = 1.0 / n as f64;

        let inv_outdegrees: &[f64] = self.inv_outdegrees.get_or_insert_with(|| {
            pl.info(format_args!("Computing inverse outdegrees..."));
            let mut inv_outdegrees = vec![0.0; n].into_boxed_slice();
            par_strided_fill(&mut inv_outdegrees, |j| match graph.outdegree(j) {
                0 => 0.0,
                d => 1.0 / d as f64,
            });
            inv_outdegrees
        });

        // Uniform initial distribution
        par_strided_fill(&mut self.ranks[0], |_| inv_n);

        pl.info(format_args!("Computing initial dangling rank..."));
        let rank = &self.ranks[0];
        let init: IterationSums = par_strided_reduce(n, |j, sums: &mut IterationSums| {
            sums.mass += rank[j];
            if graph.is_dangling(j) {
                sums.num_dangling += 1;
                sums.dangling_rank += rank[j];
            }
        });
        self.num_dangling = init.num_dangling;
        self.mass = init.mass.sum();
        let mut dangling_rank = init.dangling_rank.sum();
        log::info!("{} dangling nodes", self.num_dangling);
        log::info!("Initial dangling rank: {}", dangling_rank);

        pl.item_name("iteration");
        pl.expected_updates(None);
        pl.start(format!("Computing PageRank (alpha={alpha})..."));

        loop {
            let [first, second] = &mut self.ranks;
            let (curr, next) = if self.active == 0 {
                (&**first, &mut **second)
            } else {
                (&**second, &mut **first)
            };

            // Rank entering every node regardless of the graph structure
            let teleport = (1.0 - alpha) * inv_n;
            let dangling_share = alpha * dangling_rank * inv_n;

            cpl.item_name("node");
            cpl.expected_updates(Some(n));
            cpl.start(format!("Iteration {}...", self.iteration + 1));

            let sums: IterationSums =
                par_strided_map_reduce(next, &mut *cpl, |i, sums: &mut IterationSums| {
                    let mut sigma: KahanSum<f64> = KahanSum::new();
                    for j in graph.predecessors(i) {
                        sigma += curr[j] * inv_outdegrees[j];
                    }

                    let new_rank = alpha * sigma.sum() + teleport + dangling_share;

                    sums.norm_delta += (new_rank - curr[i]).abs();
                    sums.mass += new_rank;
                    if graph.is_dangling(i) {
                        sums.dangling_rank += new_rank;
                    }
                    new_rank
                });

            cpl.done();

            // The staging vector becomes the current approximation
            self.active ^= 1;
            self.iteration += 1;

            dangling_rank = sums.dangling_rank.sum();
            self.norm_delta = sums.norm_delta.sum();
            self.mass = sums.mass.sum();

            log::info!(
                "Iteration {}: norm delta = {}, mass = {}",
                self.iteration,
                self.norm_delta,
                self.mass
            );

            pl.update_and_display();

            if predicate.eval(&preds::PredParams {
                iteration: self.iteration,
                norm_delta: self.norm_delta,
            }) {
                break;
            }
        }

        pl.done();

        log::info!(
            "Completed after {} iteration(s), norm delta = {}",
            self.iteration,
            self.norm_delta
        );
    }
}

/// Computes PageRank with damping factor `damping`, iterating until the 𝓁₁
/// norm of the difference between successive approximations is smaller than
/// `convergence`.
///
/// The computation uses the threads of the current Rayon thread pool.
///
/// # Errors
///
/// Returns an error if `convergence` is not a positive number, as the
/// computation would not terminate.
///
/// # Panics
///
/// Panics if `damping` is not in the interval (0 . . 1).
///
/// # Examples
///
/// ```
/// # fn main() -> anyhow::Result<()> {
/// use prgraph::graphs::vec_graph::VecGraph;
/// use prgraph_algo::rank::pagerank::solve;
///
/// let g = VecGraph::from_arcs([(0, 1), (1, 0)]);
/// let rank = solve(&g, 0.85, 1E-6)?;
/// assert!((rank[0] - 0.5).abs() < 1E-6);
/// assert!((rank[1] - 0.5).abs() < 1E-6);
/// #     Ok(())
/// # }
/// ```
pub fn solve<G: PredecessorGraph + Sync>(
    graph: &G,
    damping: f64,
    convergence: f64,
) -> Result<Box<[f64]>> {
    let predicate = preds::L1Norm::try_from(convergence)?;
    let mut pr = PageRank::new(graph);
    pr.alpha(damping);
    pr.run(predicate);
    Ok(pr.into_rank())
}

/// Like [`solve`], but writes the result into a caller-provided vector.
///
/// # Errors
///
/// Returns an error if `convergence` is not a positive number.
///
/// # Panics
///
/// Panics if `damping` is not in the interval (0 . . 1) or if the length of
/// `solution` is not the number of nodes of the graph.
pub fn solve_into<G: PredecessorGraph + Sync>(
    graph: &G,
    damping: f64,
    convergence: f64,
    solution: &mut [f64],
) -> Result<()> {
    assert_eq!(
        solution.len(),
        graph.num_nodes(),
        "Solution vector length ({}) does not match the number of nodes ({})",
        solution.len(),
        graph.num_nodes()
    );
    let predicate = preds::L1Norm::try_from(convergence)?;
    let mut pr = PageRank::new(graph);
    pr.alpha(damping);
    pr.run(predicate);
    pr.copy_rank_to(solution);
    Ok(())
}
