/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Parallel PageRank on [predecessor graphs](prgraph::traits::PredecessorGraph).
//!
//! The entry points are the [`solve`](rank::pagerank::solve) function and,
//! for full control over stopping criteria and logging, the
//! [`PageRank`](rank::pagerank::PageRank) struct.

#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod rank;
pub mod utils;

pub mod prelude {
    pub use crate::rank::pagerank::{PageRank, preds, solve, solve_into};
    pub use crate::utils::{Reduce, StridedWorker, thread_pool};
}
