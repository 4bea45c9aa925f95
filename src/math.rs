// src/math.rs

//! Mathematical utilities: manifold primitives and the matrix exponential.

use crate::error::{PicardoError, Result};
use ndarray::Array2;
use ndarray_linalg::{Eigh, UPLO};

/// Compute the matrix exponential by scaling and squaring.
///
/// The input is scaled down until its norm is at most 1, expanded with a
/// truncated Taylor series, then squared back up. For a skew-symmetric input
/// the result is orthogonal, which is what moves the solver along the
/// geodesics of the orthogonal manifold.
pub fn matrix_exp(a: &Array2<f64>) -> Array2<f64> {
    let n = a.nrows();

    let norm: f64 = a.iter().map(|&x| x.abs()).fold(0.0, f64::max);
    if norm < 1e-15 {
        return Array2::eye(n);
    }

    // Scale so the series converges quickly.
    let s = norm.log2().ceil().max(0.0) as i32;
    let a_scaled = a / 2.0_f64.powi(s);

    let mut result = Array2::eye(n);
    let mut term = Array2::eye(n);
    let max_terms = 30;
    let tolerance = 1e-16;

    for k in 1..=max_terms {
        term = term.dot(&a_scaled) / k as f64;
        result = &result + &term;

        let term_norm: f64 = term.iter().map(|&x| x.abs()).fold(0.0, f64::max);
        if term_norm < tolerance {
            break;
        }
    }

    // Undo the scaling by repeated squaring.
    for _ in 0..s {
        result = result.dot(&result);
    }

    result
}

/// Project onto the skew-symmetric subspace: `(A - A^T) / 2`.
pub fn skew_symmetric(a: &Array2<f64>) -> Array2<f64> {
    (a - &a.t()) / 2.0
}

/// Frobenius norm.
pub fn frobenius_norm(a: &Array2<f64>) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Symmetric decorrelation: W <- (W . W^T)^{-1/2} . W
///
/// This makes the rows of W orthonormal, putting a caller-supplied initial
/// unmixing matrix onto the orthogonal manifold.
pub fn sym_decorrelation(w: &Array2<f64>) -> Result<Array2<f64>> {
    let ww_t = w.dot(&w.t());
    let (eigenvalues, eigenvectors) =
        ww_t.eigh(UPLO::Lower)
            .map_err(|_| PicardoError::ComputationError {
                message: "Eigendecomposition failed in symmetric decorrelation".into(),
            })?;

    let min_eigenvalue = eigenvalues.iter().cloned().fold(f64::INFINITY, f64::min);
    if min_eigenvalue < 1e-10 {
        return Err(PicardoError::SingularMatrix);
    }

    let s_inv_sqrt = eigenvalues.mapv(|v| 1.0 / v.sqrt());

    // (U . diag(1/sqrt(s)) . U^T) . W
    let scaled = &eigenvectors * &s_inv_sqrt;
    let result = scaled.dot(&eigenvectors.t()).dot(w);

    Ok(result)
}
