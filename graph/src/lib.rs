/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Read-only graphs exposing, for each node, its outdegree and the list of its
//! predecessors.
//!
//! This is the graph side of [PageRank](https://en.wikipedia.org/wiki/PageRank)
//! computations: a ranking algorithm pulls rank from the predecessors of each
//! node, so it needs random access to predecessor lists, and it splits the rank
//! of each node evenly among its successors, so it needs outdegrees. The
//! [`PredecessorGraph`](traits::PredecessorGraph) trait exposes exactly these
//! queries; [`graphs`] contains in-memory implementations.

#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]
#![allow(clippy::type_complexity)]

pub mod graphs;
pub mod traits;

pub mod prelude {
    pub use crate::graphs::prelude::*;
    pub use crate::traits::*;
}
