/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::graphs::{csr_graph::CsrGraph, vec_graph::VecGraph};

/// Provides a sequential implementation of Erdös-Rényi random graphs.
///
/// The Erdös-Rényi random graph model is a simple model for generating random
/// graphs. It is parameterized by the number of nodes `n` and the probability
/// `p` of an arc between any two nodes. In this implementation, loops are never
/// included.
///
/// Arcs are returned by [`arcs`](Self::arcs) in lexicographical order; the
/// same seed always yields the same arcs. Note that the time required to
/// enumerate the arcs is quadratic in `n`, so if you plan to reuse the graph
/// you should store it using [`to_vec_graph`](Self::to_vec_graph) or
/// [`to_csr_graph`](Self::to_csr_graph).
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    p: f64,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of
    /// nodes, the probability of an edge between any two nodes, and a
    /// seed for the [pseudorandom number generator](SmallRng).
    pub fn new(n: usize, p: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0..1]");
        Self { n, p, seed }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Returns an iterator over the arcs of the graph.
    pub fn arcs(&self) -> Arcs {
        Arcs {
            n: self.n,
            p: self.p,
            x: 0,
            y: 0,
            rng: SmallRng::seed_from_u64(self.seed),
        }
    }

    /// Stores the graph in a [`VecGraph`].
    pub fn to_vec_graph(&self) -> VecGraph {
        let mut g = VecGraph::empty(self.n);
        g.add_arcs(self.arcs());
        g
    }

    /// Stores the graph in a [`CsrGraph`].
    pub fn to_csr_graph(&self) -> CsrGraph {
        CsrGraph::try_from_arcs(self.n, self.arcs())
            .expect("Erdös-Rényi arcs are always within range")
    }
}

/// Iterator over the arcs of an [`ErdosRenyi`] graph.
#[derive(Debug, Clone)]
pub struct Arcs {
    n: usize,
    p: f64,
    x: usize,
    y: usize,
    rng: SmallRng,
}

impl Iterator for Arcs {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.x < self.n {
            while self.y < self.n {
                let y = self.y;
                self.y += 1;
                if y != self.x && self.rng.random_bool(self.p) {
                    return Some((self.x, y));
                }
            }
            self.x += 1;
            self.y = 0;
        }
        None
    }
}
