// src/score.rs

//! Score function of the tanh contrast and the relative gradient.
//!
//! The score is the derivative of the log-cosh log-likelihood surrogate used
//! by the solver. All functions here are pure: they read their inputs and
//! allocate fresh outputs.

use ndarray::{Array1, Array2, Axis};

/// Elementwise score function psi(y) = tanh(y).
///
/// `tanh` saturates to ±1 for large |y|, so this is stable for any input
/// magnitude.
pub fn score(y: &Array2<f64>) -> Array2<f64> {
    y.mapv(f64::tanh)
}

/// Per-row mean of the score derivative: `1 - mean(psi_y^2)` over samples.
///
/// Since psi_y is in (-1, 1), every entry of the output lies in [0, 1]. This
/// is the diagonal curvature term of the contrast function.
pub fn score_der(psi_y: &Array2<f64>) -> Array1<f64> {
    psi_y.map_axis(Axis(1), |row| 1.0 - row.dot(&row) / row.len() as f64)
}

/// Relative gradient of the objective: `psi_y . y^T / T`.
///
/// Off-diagonal entries measure residual dependence between source pairs;
/// the diagonal feeds the Hessian approximation.
pub fn gradient(y: &Array2<f64>, psi_y: &Array2<f64>) -> Array2<f64> {
    let t = y.ncols() as f64;
    psi_y.dot(&y.t()) / t
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_score_saturates() {
        let y = array![[1e6, -1e6, 0.0], [1e300, -1e300, 2.0]];
        let psi = score(&y);

        assert!((psi[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((psi[[0, 1]] + 1.0).abs() < 1e-12);
        assert!(psi[[0, 2]].abs() < 1e-12);
        assert!(psi.iter().all(|v| v.is_finite() && v.abs() <= 1.0));
    }

    #[test]
    fn test_score_der_bounds() {
        let y = array![[0.0, 0.0, 0.0], [-5.0, 5.0, 100.0], [0.3, -0.7, 1.2]];
        let psi = score(&y);
        let der = score_der(&psi);

        // Zero signal gives derivative 1, saturated signal gives ~0.
        assert!((der[0] - 1.0).abs() < 1e-12);
        assert!(der[1] < 1e-3);
        assert!(der.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_gradient_known_case() {
        // With psi_y == y, the gradient is the empirical correlation y y^T / T.
        let y = array![[1.0, -1.0], [1.0, 1.0]];
        let g = gradient(&y, &y);

        assert!((g[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((g[[1, 1]] - 1.0).abs() < 1e-12);
        assert!(g[[0, 1]].abs() < 1e-12);
        assert!(g[[1, 0]].abs() < 1e-12);
    }

    #[test]
    fn test_gradient_shape() {
        let y = Array2::<f64>::zeros((3, 17));
        let psi = score(&y);
        let g = gradient(&y, &psi);
        assert_eq!(g.dim(), (3, 3));
    }
}
