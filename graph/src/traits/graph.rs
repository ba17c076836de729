/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The basic trait to access a graph through its predecessors.

A [`PredecessorGraph`] has nodes identified by the integers in `0..`[`num_nodes`](PredecessorGraph::num_nodes).
For each node it provides random access to the list of its _predecessors_ (the
sources of the arcs pointing to the node) and its _outdegree_ (the number of
arcs leaving the node). A node with outdegree zero is _dangling_.

Implementations must be consistent: for each node `u`, the number of
predecessor lists containing `u` (counted with multiplicity) must be equal to
the outdegree of `u`. The function [`check_graph`] can be used to verify
this property before running an algorithm that relies on it.

*/

use std::rc::Rc;

use impl_tools::autoimpl;
use thiserror::Error;

/// A graph providing random access to predecessor lists and outdegrees.
///
/// Implementations are immutable from the point of view of this trait:
/// [`predecessors`](PredecessorGraph::predecessors) can be called any number
/// of times on the same node and must always return the same sequence.
#[autoimpl(for<S: trait + ?Sized> &S, &mut S, Rc<S>)]
pub trait PredecessorGraph {
    /// The type of the iterator over the predecessors of a node
    /// returned by [`predecessors`](PredecessorGraph::predecessors).
    type Predecessors<'a>: IntoIterator<Item = usize>
    where
        Self: 'a;

    /// Returns the number of nodes in the graph.
    fn num_nodes(&self) -> usize;

    /// Returns the number of arcs in the graph.
    fn num_arcs(&self) -> u64;

    /// Returns the number of arcs leaving a node.
    fn outdegree(&self, node: usize) -> usize;

    /// Returns the predecessors of a node, that is, the sources of the arcs
    /// pointing to it.
    fn predecessors(&self, node: usize) -> Self::Predecessors<'_>;

    /// Returns the number of arcs pointing to a node.
    ///
    /// The default implementation counts the predecessors.
    fn indegree(&self, node: usize) -> usize {
        self.predecessors(node).into_iter().count()
    }

    /// Returns whether a node has no outgoing arcs.
    #[inline(always)]
    fn is_dangling(&self, node: usize) -> bool {
        self.outdegree(node) == 0
    }
}

/// Error types that can occur when checking the consistency of a
/// [`PredecessorGraph`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckGraphError {
    /// A predecessor list contains a node that does not exist.
    #[error("Node {node} has predecessor {predecessor}, but the graph has {num_nodes} nodes")]
    PredecessorOutOfRange {
        node: usize,
        predecessor: usize,
        num_nodes: usize,
    },

    /// The outdegree returned by
    /// [`outdegree`](PredecessorGraph::outdegree) is different from the
    /// number of occurrences of the node in predecessor lists.
    #[error(
        "Different outdegree for node {node}: {predecessors} (predecessor lists) != {method} (outdegree)"
    )]
    Outdegree {
        node: usize,
        predecessors: usize,
        method: usize,
    },

    /// The number of arcs in predecessor lists is different from the number
    /// returned by [`num_arcs`](PredecessorGraph::num_arcs).
    #[error("Different number of arcs: {predecessors} (predecessor lists) != {method} (num_arcs)")]
    NumArcs { predecessors: u64, method: u64 },
}

/// Checks that the predecessor lists of a graph are consistent with its
/// outdegrees and its number of arcs.
///
/// The check is sequential and uses a vector of counters with one entry per
/// node.
pub fn check_graph<G: PredecessorGraph>(g: G) -> Result<(), CheckGraphError> {
    let num_nodes = g.num_nodes();
    let mut counts = vec![0usize; num_nodes];
    let mut num_arcs: u64 = 0;

    for node in 0..num_nodes {
        for predecessor in g.predecessors(node) {
            if predecessor >= num_nodes {
                return Err(CheckGraphError::PredecessorOutOfRange {
                    node,
                    predecessor,
                    num_nodes,
                });
            }
            counts[predecessor] += 1;
            num_arcs += 1;
        }
    }

    for (node, &predecessors) in counts.iter().enumerate() {
        let method = g.outdegree(node);
        if predecessors != method {
            return Err(CheckGraphError::Outdegree {
                node,
                predecessors,
                method,
            });
        }
    }

    if num_arcs != g.num_arcs() {
        return Err(CheckGraphError::NumArcs {
            predecessors: num_arcs,
            method: g.num_arcs(),
        });
    }

    Ok(())
}
