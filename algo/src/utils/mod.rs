/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Utilities for strided fork-join parallelism.
//!
//! All parallel regions in this crate are executed by
//! [broadcasting](rayon::broadcast) a task to every thread of the current
//! Rayon thread pool. Each task receives an explicit [`StridedWorker`]
//! describing which nodes it owns, and may produce a private partial result
//! implementing [`Reduce`]; partial results are combined by the calling thread
//! after all tasks have completed.

mod reduce;
pub use reduce::*;

mod strided;
pub use strided::*;

use anyhow::{Context, Result};

/// Builds a Rayon thread pool with the given number of threads.
///
/// If `num_threads` is `None`, the number of logical CPUs is used. Parallel
/// regions started inside [`ThreadPool::install`](rayon::ThreadPool::install)
/// use one worker per thread of the pool.
pub fn thread_pool(num_threads: Option<usize>) -> Result<rayon::ThreadPool> {
    let num_threads = num_threads.unwrap_or_else(num_cpus::get);
    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Could not create thread pool")?;
    log::info!("Using {} threads", thread_pool.current_num_threads());
    Ok(thread_pool)
}
