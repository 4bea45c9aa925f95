// src/solver.rs

//! Public Picard-O solver interface.

use crate::config::PicardoConfig;
use crate::core;
use crate::error::{PicardoError, Result};
use crate::math::sym_decorrelation;
use crate::result::PicardoResult;

use ndarray::Array2;

/// The Picard-O solver: preconditioned L-BFGS ICA under orthogonal
/// constraint.
///
/// The input is expected to be centered and whitened; preprocessing of raw
/// signals is the caller's responsibility.
pub struct Picardo;

impl Picardo {
    /// Fit with default configuration.
    ///
    /// # Arguments
    /// * `x` - Centered, whitened signal matrix of shape (n_components, n_samples)
    ///
    /// # Returns
    /// * `PicardoResult` with the unmixing matrix, sources, and diagnostics
    pub fn fit(x: &Array2<f64>) -> Result<PicardoResult> {
        Self::fit_with_config(x, &PicardoConfig::default())
    }

    /// Fit with custom configuration.
    ///
    /// Non-convergence within the iteration budget is not an error: the
    /// returned result carries `converged = false` and the final gradient
    /// norm.
    pub fn fit_with_config(x: &Array2<f64>, config: &PicardoConfig) -> Result<PicardoResult> {
        config.validate()?;

        let (n, t) = x.dim();
        if n == 0 || t == 0 {
            return Err(PicardoError::InvalidDimensions {
                message: "Input matrix cannot be empty".into(),
            });
        }

        // A caller-supplied initial unmixing matrix is decorrelated so the
        // run starts on the orthogonal manifold.
        let w_init = match &config.w_init {
            Some(w0) => {
                if w0.nrows() != n || w0.ncols() != n {
                    return Err(PicardoError::InvalidDimensions {
                        message: format!(
                            "w_init shape ({}, {}) doesn't match expected ({}, {})",
                            w0.nrows(),
                            w0.ncols(),
                            n,
                            n
                        ),
                    });
                }
                Some(sym_decorrelation(w0)?)
            }
            None => None,
        };

        let x1 = match &w_init {
            Some(w0) => w0.dot(x),
            None => x.clone(),
        };

        if config.verbose {
            println!("Running Picard-O...");
        }

        let (sources, w, info) = core::run(
            &x1,
            config.m,
            config.max_iter,
            config.tol,
            config.lambda_min,
            config.ls_tries,
            config.verbose,
        );

        // Fold the initial transform into the reported unmixing operator.
        let unmixing = match w_init {
            Some(w0) => w.dot(&w0),
            None => w,
        };

        if !info.converged && config.verbose {
            eprintln!(
                "Warning: Picard-O did not converge. \
                 Final gradient norm: {:.4e}, tolerance: {:.4e}",
                info.gradient_norm, config.tol
            );
        }

        Ok(PicardoResult {
            unmixing,
            sources,
            n_iterations: info.n_iterations,
            converged: info.converged,
            gradient_norm: info.gradient_norm,
            signs: info.signs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::frobenius_norm;
    use crate::utils::{amari_distance, fix_signs, permute};
    use ndarray::{array, Array2};
    use ndarray_linalg::{Eigh, UPLO};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    /// One uniform (sub-Gaussian) and one Laplace (super-Gaussian) source,
    /// both unit variance, mixed by a fixed non-singular matrix.
    fn generate_mixture(t: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut s = Array2::zeros((2, t));
        for j in 0..t {
            s[[0, j]] = rng.random_range(-1.0..1.0) * 3.0_f64.sqrt();

            let magnitude = -(1.0 - rng.random::<f64>()).ln();
            let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
            s[[1, j]] = sign * magnitude / 2.0_f64.sqrt();
        }

        let a = array![[1.0, 0.6], [0.4, 1.0]];
        let x = a.dot(&s);
        (a, x)
    }

    fn center_rows(x: &mut Array2<f64>) {
        for mut row in x.outer_iter_mut() {
            let mean = row.sum() / row.len() as f64;
            row.mapv_inplace(|v| v - mean);
        }
    }

    /// PCA whitening, returning (whitened data, whitening matrix).
    fn whiten(x: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let t = x.ncols() as f64;
        let c = x.dot(&x.t()) / t;
        let (eigenvalues, eigenvectors) = c.eigh(UPLO::Lower).unwrap();
        let scaled = &eigenvectors * &eigenvalues.mapv(|v| 1.0 / v.sqrt());
        let k = scaled.dot(&eigenvectors.t());
        (k.dot(x), k)
    }

    #[test]
    fn test_fit_default() {
        let (_, mut x) = generate_mixture(1000, 42);
        center_rows(&mut x);
        let (xw, _) = whiten(&x);

        let result = Picardo::fit(&xw).unwrap();

        assert_eq!(result.sources.dim(), (2, 1000));
        assert_eq!(result.unmixing.dim(), (2, 2));
        assert!(result.n_iterations > 0);
    }

    #[test]
    fn test_separates_uniform_laplace_mixture() {
        let (a, mut x) = generate_mixture(5000, 42);
        center_rows(&mut x);
        let (xw, k) = whiten(&x);

        let config = PicardoConfig::builder().max_iter(200).tol(1e-7).build();
        let result = Picardo::fit_with_config(&xw, &config).unwrap();

        assert!(result.converged, "gradient norm {}", result.gradient_norm);
        assert!(result.gradient_norm < 1e-7);

        // The transfer matrix from true sources to recovered sources must be
        // a signed permutation.
        let full_unmixing = result.unmixing.dot(&k);
        assert!(amari_distance(&full_unmixing, &a) < 5e-3);

        let p = permute(&full_unmixing.dot(&a), true);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (p[[i, j]] - expected).abs() < 5e-2,
                    "transfer matrix entry ({}, {}) = {}",
                    i,
                    j,
                    p[[i, j]]
                );
            }
        }

        // One sub-Gaussian and one super-Gaussian source were detected.
        let mut signs: Vec<f64> = result.signs.iter().cloned().collect();
        signs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(signs, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_unmixing_is_orthogonal() {
        let (_, mut x) = generate_mixture(2000, 11);
        center_rows(&mut x);
        let (xw, _) = whiten(&x);

        let result = Picardo::fit(&xw).unwrap();
        let wt_w = result.unmixing.t().dot(&result.unmixing);
        let eye = Array2::<f64>::eye(2);

        assert!(frobenius_norm(&(&wt_w - &eye)) < 1e-10);
    }

    #[test]
    fn test_canonical_signs_reproducible() {
        let (_, mut x) = generate_mixture(3000, 7);
        center_rows(&mut x);
        let (xw, _) = whiten(&x);

        let first = Picardo::fit(&xw).unwrap();
        let second = Picardo::fit(&xw).unwrap();

        let mut y1 = first.sources;
        let mut y2 = second.sources;
        fix_signs(&mut y1);
        fix_signs(&mut y2);

        assert!(frobenius_norm(&(&y1 - &y2)) < 1e-12);

        // After fixing, every row has a non-negative third moment.
        for row in y1.outer_iter() {
            let m3: f64 = row.iter().map(|&v| v * v * v).sum();
            assert!(m3 >= 0.0);
        }
    }

    #[test]
    fn test_w_init_is_decorrelated() {
        let (_, mut x) = generate_mixture(2000, 3);
        center_rows(&mut x);
        let (xw, _) = whiten(&x);

        // A random (non-orthogonal) initial matrix.
        let mut rng = StdRng::seed_from_u64(1);
        let mut w0 = Array2::<f64>::zeros((2, 2));
        for i in 0..2 {
            for j in 0..2 {
                w0[[i, j]] = rng.sample(StandardNormal);
            }
        }

        let config = PicardoConfig::builder().w_init(w0).build();
        let result = Picardo::fit_with_config(&xw, &config).unwrap();

        let wt_w = result.unmixing.t().dot(&result.unmixing);
        let eye = Array2::<f64>::eye(2);
        assert!(frobenius_norm(&(&wt_w - &eye)) < 1e-10);
    }

    #[test]
    fn test_w_init_shape_mismatch() {
        let x = Array2::<f64>::zeros((3, 100));
        let config = PicardoConfig::builder()
            .w_init(Array2::eye(2))
            .build();

        assert!(matches!(
            Picardo::fit_with_config(&x, &config),
            Err(PicardoError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        let x = Array2::<f64>::zeros((0, 0));
        assert!(matches!(
            Picardo::fit(&x),
            Err(PicardoError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let x = Array2::<f64>::zeros((2, 100));
        let config = PicardoConfig::builder().max_iter(0).build();
        assert!(matches!(
            Picardo::fit_with_config(&x, &config),
            Err(PicardoError::InvalidConfig { .. })
        ));
    }
}
