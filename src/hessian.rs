// src/hessian.rs

//! Hessian approximation on the tangent space of the orthogonal manifold.
//!
//! The full Hessian of the objective is O(N^4); restricted to the
//! skew-symmetric subspace it is block-diagonal with 2x2 blocks indexed by
//! source pairs, and dropping the cross terms leaves one scalar per pair.
//! That diagonal approximation costs O(N^2) and is what preconditions the
//! L-BFGS direction.

use ndarray::{Array1, Array2};

/// Projected Hessian approximation.
///
/// `h[(i, j)] = 0.5 * (psi_dy_mean[i] + psi_dy_mean[j] - g[(i, i)] - g[(j, j)])`
///
/// The result is symmetric in (i, j) by construction.
pub fn proj_hessian_approx(psi_dy_mean: &Array1<f64>, g: &Array2<f64>) -> Array2<f64> {
    let n = psi_dy_mean.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        0.5 * (psi_dy_mean[i] + psi_dy_mean[j] - g[[i, i]] - g[[j, j]])
    })
}

/// Clip every entry of `h` below `lambda_min` up to `lambda_min`, in place.
///
/// Guarantees `h` is usable as a denominator in [`solve_hessian`] without
/// non-positive or near-zero divisors.
pub fn regularize_hessian(h: &mut Array2<f64>, lambda_min: f64) {
    h.mapv_inplace(|v| v.max(lambda_min));
}

/// Apply the inverse of the diagonal Hessian approximation: elementwise `g / h`.
pub fn solve_hessian(g: &Array2<f64>, h: &Array2<f64>) -> Array2<f64> {
    g / h
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_proj_hessian_symmetric() {
        let psi_dy_mean = array![0.3, 0.8, 0.5];
        let g = array![[0.1, 2.0, 3.0], [4.0, -0.2, 5.0], [6.0, 7.0, 0.4]];
        let h = proj_hessian_approx(&psi_dy_mean, &g);

        assert_eq!(h.dim(), (3, 3));
        for i in 0..3 {
            for j in 0..3 {
                assert!((h[[i, j]] - h[[j, i]]).abs() < 1e-15);
            }
        }
        // Spot check one entry.
        let expected = 0.5 * (0.3 + 0.8 - 0.1 - (-0.2));
        assert!((h[[0, 1]] - expected).abs() < 1e-15);
    }

    #[test]
    fn test_regularize_floor() {
        let mut h = array![[-3.0, 0.001], [0.5, -0.2]];
        let lambda_min = 0.01;
        regularize_hessian(&mut h, lambda_min);

        assert!(h.iter().all(|&v| v >= lambda_min));
        // Entries already above the floor are untouched.
        assert!((h[[1, 0]] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_solve_hessian_elementwise() {
        let g = array![[2.0, -4.0], [6.0, 8.0]];
        let h = array![[2.0, 2.0], [3.0, 4.0]];
        let z = solve_hessian(&g, &h);

        assert!((z[[0, 0]] - 1.0).abs() < 1e-15);
        assert!((z[[0, 1]] + 2.0).abs() < 1e-15);
        assert!((z[[1, 0]] - 2.0).abs() < 1e-15);
        assert!((z[[1, 1]] - 2.0).abs() < 1e-15);
    }
}
