//! L-BFGS history and the preconditioned two-loop recursion.

use std::collections::VecDeque;

use ndarray::Array2;

use crate::hessian::solve_hessian;

/// One history record: a step, the matching gradient change, and the
/// reciprocal curvature `r = 1 / sum(s * y)`.
pub struct LbfgsPair {
    /// Accepted step (alpha * direction).
    pub s: Array2<f64>,
    /// Gradient difference across that step.
    pub y: Array2<f64>,
    /// Reciprocal curvature.
    pub r: f64,
}

/// Bounded FIFO of L-BFGS history records.
///
/// Each entry is a single composite record, so the step/gradient/curvature
/// sequences can never get out of sync. Oldest records are evicted when the
/// memory is full.
pub struct LbfgsMemory {
    pairs: VecDeque<LbfgsPair>,
    capacity: usize,
}

impl LbfgsMemory {
    /// Create a memory holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            pairs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new (step, gradient-difference) record.
    ///
    /// The record is admitted only when the curvature `sum(s * y)` is
    /// positive; otherwise the pair is discarded and `false` is returned.
    /// Admitting a record beyond capacity evicts the oldest one.
    pub fn push(&mut self, s: Array2<f64>, y: Array2<f64>) -> bool {
        let sy: f64 = (&s * &y).sum();
        if !sy.is_finite() || sy <= 1e-10 {
            return false;
        }

        if self.pairs.len() >= self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back(LbfgsPair { s, y, r: 1.0 / sy });
        true
    }

    /// Drop all stored records.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the memory holds no records.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over records from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LbfgsPair> {
        self.pairs.iter()
    }
}

/// Two-loop recursion with a diagonal Hessian preconditioner.
///
/// The classical recursion scales the intermediate vector by a scalar
/// gamma; here the scaling is replaced by [`solve_hessian`] with the
/// projected Hessian approximation, which is what makes the method fast on
/// the orthogonal manifold. `g` is not mutated: callers still need the
/// unmodified gradient for the convergence diagnostic.
///
/// With empty history this degenerates to `-solve_hessian(g, h)`.
pub fn lbfgs_direction(g: &Array2<f64>, h: &Array2<f64>, memory: &LbfgsMemory) -> Array2<f64> {
    let mut q = g.clone();
    let mut alpha_list = Vec::with_capacity(memory.len());

    // Backward pass, most recent record first.
    for pair in memory.iter().rev() {
        let alpha = pair.r * (&pair.s * &q).sum();
        alpha_list.push(alpha);
        q = &q - alpha * &pair.y;
    }

    let mut z = solve_hessian(&q, h);

    // Forward pass, oldest first, consuming alphas in reverse.
    for (pair, &alpha) in memory.iter().zip(alpha_list.iter().rev()) {
        let beta = pair.r * (&pair.y * &z).sum();
        z = &z + (alpha - beta) * &pair.s;
    }

    -z
}
