/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Implementations of graphs.

pub mod csr_graph;
pub mod random;
pub mod vec_graph;

pub mod prelude {
    pub use super::csr_graph::CsrGraph;
    pub use super::random::ErdosRenyi;
    pub use super::vec_graph::VecGraph;
}
