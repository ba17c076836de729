/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use kahan::KahanSum;
use std::ops::AddAssign;

/// A partial result of a parallel computation.
///
/// Each worker of a parallel region starts from [`Default::default`],
/// accumulates into a private instance, and hands it back at the end of the
/// region. The partial results of all workers are then merged using
/// [`combine`](Reduce::combine).
///
/// Since the number of workers and the order in which their results are
/// merged are not fixed, `combine` must be associative and commutative, and
/// the default value must be its identity. For floating-point types this holds
/// only up to rounding, so results of a reduction are reproducible only within
/// the accuracy of the summation.
pub trait Reduce: Default + Send {
    /// Merges two partial results.
    fn combine(self, other: Self) -> Self;
}

impl Reduce for usize {
    #[inline(always)]
    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl Reduce for f64 {
    #[inline(always)]
    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl<A: Reduce, B: Reduce> Reduce for (A, B) {
    #[inline(always)]
    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

/// A compensated ([Kahan](https://en.wikipedia.org/wiki/Kahan_summation_algorithm))
/// sum of doubles usable as a partial result.
#[derive(Debug, Clone)]
pub struct CompensatedSum(KahanSum<f64>);

impl CompensatedSum {
    /// Returns the current value of the sum.
    #[inline(always)]
    pub fn sum(&self) -> f64 {
        self.0.sum()
    }
}

impl Default for CompensatedSum {
    fn default() -> Self {
        Self(KahanSum::new())
    }
}

impl AddAssign<f64> for CompensatedSum {
    #[inline(always)]
    fn add_assign(&mut self, x: f64) {
        self.0 += x;
    }
}

impl Reduce for CompensatedSum {
    #[inline(always)]
    fn combine(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}
