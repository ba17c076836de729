/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::prelude::*;

/// A mutable [`PredecessorGraph`] implementation based on a vector of
/// vectors.
///
/// For each node the graph stores its list of predecessors and its outdegree.
/// Arcs pointing to the same node must be added in increasing source order, so
/// predecessor lists are always sorted and contain no duplicates; if you need
/// to add arcs in arbitrary order, use [`add_arcs`](Self::add_arcs), which
/// sorts them first.
///
/// By setting the feature `serde`, this struct can be serialized using
/// [serde](https://crates.io/crates/serde).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecGraph {
    /// The number of arcs in the graph.
    num_arcs: u64,
    /// For each node, its list of predecessors.
    pred: Vec<Vec<usize>>,
    /// For each node, its outdegree.
    outdegrees: Vec<usize>,
}

impl VecGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty graph with `n` nodes.
    pub fn empty(n: usize) -> Self {
        Self {
            num_arcs: 0,
            pred: Vec::from_iter((0..n).map(|_| Vec::new())),
            outdegrees: vec![0; n],
        }
    }

    /// Adds an isolated node to the graph and returns true if it is a new node.
    ///
    /// Nodes between the current number of nodes and `node` are added, too.
    pub fn add_node(&mut self, node: usize) -> bool {
        let len = self.pred.len();
        self.pred.extend((len..=node).map(|_| Vec::new()));
        self.outdegrees.resize(self.pred.len(), 0);
        len <= node
    }

    /// Adds an arc from `u` to `v` to the graph.
    ///
    /// Arcs pointing to the same node must be added in increasing source
    /// order, or this method will panic.
    ///
    /// # Panics
    ///
    /// This method will panic:
    /// - if one of the given nodes is greater or equal than the number of nodes
    ///   in the graph;
    /// - if the source is lesser than or equal to the current last predecessor
    ///   of the target node.
    pub fn add_arc(&mut self, u: usize, v: usize) {
        let max = u.max(v);
        if max >= self.pred.len() {
            panic!(
                "Node {} does not exist (the graph has {} nodes)",
                max,
                self.pred.len(),
            );
        }
        let pred = &mut self.pred[v];

        if let Some(&last) = pred.last() {
            if u <= last {
                // arcs have to be inserted in increasing source order
                panic!(
                    "Error adding arc ({u}, {v}): source is not increasing; the last arc inserted was ({last}, {v})"
                );
            }
        }
        pred.push(u);
        self.outdegrees[u] += 1;
        self.num_arcs += 1;
    }

    /// Adds arcs from an [`IntoIterator`] of pairs `(source, target)`, adding
    /// new nodes as needed.
    ///
    /// Arcs are sorted before insertion, so they can be given in any order,
    /// but they must not contain duplicates.
    pub fn add_arcs(&mut self, arcs: impl IntoIterator<Item = (usize, usize)>) {
        let mut arcs = arcs.into_iter().collect::<Vec<_>>();
        arcs.sort_by_key(|&(u, v)| (v, u));
        for (u, v) in arcs {
            self.add_node(u);
            self.add_node(v);
            self.add_arc(u, v);
        }
    }

    /// Creates a new graph from an [`IntoIterator`] of pairs
    /// `(source, target)`.
    ///
    /// The number of nodes is one plus the largest node appearing in an arc;
    /// use [`empty`](Self::empty) followed by [`add_arcs`](Self::add_arcs) if
    /// the graph has trailing isolated nodes.
    pub fn from_arcs(arcs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut g = Self::new();
        g.add_arcs(arcs);
        g
    }
}

impl PredecessorGraph for VecGraph {
    type Predecessors<'a> = core::iter::Copied<core::slice::Iter<'a, usize>>;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.pred.len()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        self.num_arcs
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        self.outdegrees[node]
    }

    #[inline(always)]
    fn predecessors(&self, node: usize) -> Self::Predecessors<'_> {
        self.pred[node].iter().copied()
    }

    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        self.pred[node].len()
    }
}
