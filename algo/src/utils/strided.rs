/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::Reduce;
use dsi_progress_logger::ConcurrentProgressLog;
use rayon::BroadcastContext;
use std::iter::StepBy;
use std::ops::Range;
use sync_cell_slice::SyncSlice;

/// A worker of a parallel region, and the nodes it owns.
///
/// Nodes are assigned in an interleaved fashion: worker `index` out of `count`
/// owns nodes `index`, `index + count`, `index + 2 · count`, and so on. On
/// graphs with skewed degree distributions, nodes with large indegree are in
/// this way spread among workers, rather than concentrated in a contiguous
/// block.
///
/// The assignment depends only on the index and the count, so it can be
/// reproduced outside of a parallel region (e.g., in tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedWorker {
    index: usize,
    count: usize,
}

impl StridedWorker {
    /// Creates the worker of given index in a region with `count` workers.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or `index` is not smaller than `count`.
    pub fn new(index: usize, count: usize) -> Self {
        assert!(
            index < count,
            "Worker index {index} out of range (the region has {count} workers)"
        );
        Self { index, count }
    }

    /// Returns the index of this worker.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of workers in the region.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the nodes in `0..n` owned by this worker, in increasing order.
    #[inline(always)]
    pub fn nodes(&self, n: usize) -> StepBy<Range<usize>> {
        (self.index..n).step_by(self.count)
    }

    /// Returns the number of nodes in `0..n` owned by this worker.
    pub fn num_nodes(&self, n: usize) -> usize {
        n.saturating_sub(self.index).div_ceil(self.count)
    }
}

impl From<BroadcastContext<'_>> for StridedWorker {
    fn from(ctx: BroadcastContext<'_>) -> Self {
        Self::new(ctx.index(), ctx.num_threads())
    }
}

/// Sets in parallel `dst[i]` to `f(i)` for every index `i`.
///
/// Every thread of the current Rayon thread pool writes the elements of the
/// indices it owns as a [`StridedWorker`]; the function returns when all
/// threads are done.
pub fn par_strided_fill<T: Send + Sync, F: Fn(usize) -> T + Sync>(dst: &mut [T], f: F) {
    let n = dst.len();
    let dst = dst.as_sync_slice();
    rayon::broadcast(|ctx| {
        let worker = StridedWorker::from(ctx);
        for i in worker.nodes(n) {
            // SAFETY: index i is written only by its owner.
            unsafe { dst[i].set(f(i)) };
        }
    });
}

/// Sets in parallel `dst[i]` to `map(i, partial)` for every index `i`, and
/// returns the combination of the partial results.
///
/// Every thread of the current Rayon thread pool starts from a default
/// partial result, which it passes to `map` for each index it owns as a
/// [`StridedWorker`]. When all threads are done, the partial results are
/// [combined](Reduce::combine) in worker order.
///
/// `cpl` is cloned in each thread and updated with the number of indices
/// processed by the thread.
pub fn par_strided_map_reduce<T, R, F>(
    dst: &mut [T],
    cpl: &mut impl ConcurrentProgressLog,
    map: F,
) -> R
where
    T: Send + Sync,
    R: Reduce,
    F: Fn(usize, &mut R) -> T + Sync,
{
    let n = dst.len();
    let dst = dst.as_sync_slice();
    let cpl = &*cpl;
    rayon::broadcast(|ctx| {
        let worker = StridedWorker::from(ctx);
        let mut local_cpl = cpl.clone();
        let mut partial = R::default();
        for i in worker.nodes(n) {
            let value = map(i, &mut partial);
            // SAFETY: index i is written only by its owner.
            unsafe { dst[i].set(value) };
        }
        local_cpl.update_with_count(worker.num_nodes(n));
        partial
    })
    .into_iter()
    .fold(R::default(), R::combine)
}

/// Applies in parallel `f(i, partial)` to every index `i` in `0..n`, and
/// returns the combination of the partial results.
///
/// This is the read-only counterpart of [`par_strided_map_reduce`].
pub fn par_strided_reduce<R, F>(n: usize, f: F) -> R
where
    R: Reduce,
    F: Fn(usize, &mut R) + Sync,
{
    rayon::broadcast(|ctx| {
        let worker = StridedWorker::from(ctx);
        let mut partial = R::default();
        for i in worker.nodes(n) {
            f(i, &mut partial);
        }
        partial
    })
    .into_iter()
    .fold(R::default(), R::combine)
}
