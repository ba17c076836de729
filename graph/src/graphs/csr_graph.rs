/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::*;
use thiserror::Error;

/// Errors that can occur while building a [`CsrGraph`] from a list of arcs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArcError {
    /// An arc mentions a node that is not smaller than the declared number
    /// of nodes.
    #[error("Arc ({src}, {dst}) mentions node {node}, but the graph has {num_nodes} nodes")]
    NodeOutOfRange {
        src: usize,
        dst: usize,
        node: usize,
        num_nodes: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// A compressed sparse-row graph indexed by target.
///
/// The graph stores the degree-cumulative function (DCF) of the _indegrees_
/// and the concatenation of the predecessor lists, plus a vector of
/// outdegrees. The DCF is a sequence of offsets that indicates the start of
/// the predecessors of each node. Predecessor lists are sorted, and
/// multiple arcs are preserved.
///
/// This is the layout a pull-based ranking algorithm reads: for each node, a
/// contiguous slice of predecessors and a constant-time outdegree.
pub struct CsrGraph {
    dcf: Box<[usize]>,
    predecessors: Box<[usize]>,
    outdegrees: Box<[usize]>,
}

impl core::default::Default for CsrGraph {
    fn default() -> Self {
        Self {
            dcf: vec![0].into(),
            predecessors: vec![].into(),
            outdegrees: vec![].into(),
        }
    }
}

impl CsrGraph {
    /// Creates an empty CSR graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CSR graph with `num_nodes` nodes from an
    /// [`IntoIterator`] of pairs `(source, target)`.
    ///
    /// Arcs can be given in any order.
    pub fn try_from_arcs(
        num_nodes: usize,
        arcs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, ArcError> {
        let mut arcs = arcs.into_iter().collect::<Vec<_>>();
        let mut outdegrees = vec![0; num_nodes];
        let mut dcf = vec![0; num_nodes + 1];

        for &(src, dst) in &arcs {
            let node = src.max(dst);
            if node >= num_nodes {
                return Err(ArcError::NodeOutOfRange {
                    src,
                    dst,
                    node,
                    num_nodes,
                });
            }
            outdegrees[src] += 1;
            dcf[dst + 1] += 1;
        }

        for i in 0..num_nodes {
            dcf[i + 1] += dcf[i];
        }

        arcs.sort_unstable_by_key(|&(src, dst)| (dst, src));
        let predecessors = arcs.into_iter().map(|(src, _)| src).collect::<Vec<_>>();

        log::debug!(
            "Built CSR graph with {} nodes and {} arcs",
            num_nodes,
            predecessors.len()
        );

        Ok(Self {
            dcf: dcf.into(),
            predecessors: predecessors.into(),
            outdegrees: outdegrees.into(),
        })
    }

    /// Creates a new CSR graph by copying another [`PredecessorGraph`].
    pub fn from_graph<G: PredecessorGraph>(g: &G) -> Self {
        let num_nodes = g.num_nodes();
        let mut dcf = Vec::with_capacity(num_nodes + 1);
        let mut predecessors = Vec::with_capacity(g.num_arcs() as usize);
        let mut outdegrees = Vec::with_capacity(num_nodes);

        dcf.push(0);
        for node in 0..num_nodes {
            predecessors.extend(g.predecessors(node));
            dcf.push(predecessors.len());
            outdegrees.push(g.outdegree(node));
        }

        Self {
            dcf: dcf.into(),
            predecessors: predecessors.into(),
            outdegrees: outdegrees.into(),
        }
    }

    /// Returns the degree-cumulative function of the indegrees.
    pub fn dcf(&self) -> &[usize] {
        &self.dcf
    }

    /// Returns the outdegrees of all nodes.
    pub fn outdegrees(&self) -> &[usize] {
        &self.outdegrees
    }
}

impl PredecessorGraph for CsrGraph {
    type Predecessors<'a> = core::iter::Copied<core::slice::Iter<'a, usize>>;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.outdegrees.len()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        self.predecessors.len() as u64
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        self.outdegrees[node]
    }

    #[inline(always)]
    fn predecessors(&self, node: usize) -> Self::Predecessors<'_> {
        self.predecessors[self.dcf[node]..self.dcf[node + 1]]
            .iter()
            .copied()
    }

    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        self.dcf[node + 1] - self.dcf[node]
    }
}
