//! Result type for the Picard-O solver.

use ndarray::{Array1, Array2};

/// Result of running the Picard-O solver.
#[derive(Debug, Clone)]
pub struct PicardoResult {
    /// Orthogonal unmixing matrix W (n x n).
    pub unmixing: Array2<f64>,

    /// Estimated independent sources (n x n_samples), `W . X`.
    pub sources: Array2<f64>,

    /// Number of iterations performed.
    pub n_iterations: usize,

    /// Whether the gradient norm reached the tolerance.
    pub converged: bool,

    /// Final gradient norm.
    pub gradient_norm: f64,

    /// Kurtosis signs used by the objective (+1 super-Gaussian,
    /// -1 sub-Gaussian), one per source.
    pub signs: Array1<f64>,
}

impl PicardoResult {
    /// Mixing matrix that maps sources back to the input signals.
    ///
    /// The unmixing operator is orthogonal, so its inverse is its transpose.
    pub fn mixing(&self) -> Array2<f64> {
        self.unmixing.t().to_owned()
    }
}
