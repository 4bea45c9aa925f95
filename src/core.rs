// src/core.rs

//! Core Picard-O loop: loss, manifold line search, and the driver.

use ndarray::{Array1, Array2};

use crate::hessian::{proj_hessian_approx, regularize_hessian, solve_hessian};
use crate::lbfgs::{lbfgs_direction, LbfgsMemory};
use crate::math::{frobenius_norm, matrix_exp, skew_symmetric};
use crate::score::{gradient, score, score_der};

/// Information returned from the core loop.
pub struct CoreInfo {
    /// Whether the gradient norm reached the tolerance.
    pub converged: bool,
    /// Final gradient norm.
    pub gradient_norm: f64,
    /// Number of iterations performed.
    pub n_iterations: usize,
    /// Kurtosis signs (+1 super-Gaussian, -1 sub-Gaussian), one per source.
    pub signs: Array1<f64>,
}

/// Signed log-cosh loss.
///
/// Uses `log(cosh(y)) = |y| + log1p(exp(-2|y|)) - log(2)`, dropping the
/// constant: only loss differences matter for the line search. The direct
/// form would overflow for large |y|.
pub fn loss(y: &Array2<f64>, signs: &Array1<f64>) -> f64 {
    let t = y.ncols() as f64;
    let mut output = 0.0;
    for (row, &sign) in y.outer_iter().zip(signs.iter()) {
        let total: f64 = row
            .iter()
            .map(|&v| {
                let a = v.abs();
                a + (-2.0 * a).exp().ln_1p()
            })
            .sum();
        output += sign * total / t;
    }
    output
}

/// Result of a backtracking line search.
pub struct LineSearchResult {
    /// Whether a strictly decreasing step was found.
    pub success: bool,
    /// Accepted signals on success; the last attempted candidate on failure.
    pub y: Array2<f64>,
    /// Loss of `y`.
    pub loss: f64,
    /// Step size of the last attempt.
    pub alpha: f64,
}

/// Backtracking line search along the orthogonal-manifold geodesic.
///
/// Starting from `alpha = 1`, evaluates `expm(alpha * direction) . y` and
/// halves `alpha` until the loss strictly decreases, for at most `ls_tries`
/// attempts. `direction` must be skew-symmetric so every candidate stays an
/// orthogonal transform of `y`. When `current_loss` is `None` it is computed
/// once from `y` before the loop.
///
/// On failure the *last attempted* candidate is returned; callers must not
/// apply it.
pub fn line_search(
    y: &Array2<f64>,
    signs: &Array1<f64>,
    direction: &Array2<f64>,
    current_loss: Option<f64>,
    ls_tries: usize,
) -> LineSearchResult {
    let current_loss = current_loss.unwrap_or_else(|| loss(y, signs));

    let mut alpha = 1.0;
    let mut y_new = y.clone();
    let mut new_loss = current_loss;

    for attempt in 0..ls_tries {
        if attempt > 0 {
            alpha /= 2.0;
        }

        let transform = matrix_exp(&(direction * alpha));
        y_new = transform.dot(y);
        new_loss = loss(&y_new, signs);

        if new_loss < current_loss {
            return LineSearchResult {
                success: true,
                y: y_new,
                loss: new_loss,
                alpha,
            };
        }
    }

    LineSearchResult {
        success: false,
        y: y_new,
        loss: new_loss,
        alpha,
    }
}

/// Run the Picard-O loop on centered, whitened signals.
///
/// Returns the unmixed signals, the cumulative orthogonal unmixing operator,
/// and convergence diagnostics. Non-convergence within `max_iter` is reported
/// through [`CoreInfo`], not as an error.
pub fn run(
    x: &Array2<f64>,
    m: usize,
    max_iter: usize,
    tol: f64,
    lambda_min: f64,
    ls_tries: usize,
    verbose: bool,
) -> (Array2<f64>, Array2<f64>, CoreInfo) {
    let n = x.nrows();

    let mut w = Array2::<f64>::eye(n);
    let mut y = x.clone();

    let mut memory = LbfgsMemory::new(m);
    let mut signs = Array1::<f64>::ones(n);
    let mut old_signs = signs.clone();
    let mut current_loss: Option<f64> = None;
    let mut g_skew_old: Option<Array2<f64>> = None;
    let mut pending_step: Option<Array2<f64>> = None;

    let mut gradient_norm = f64::INFINITY;
    let mut converged = false;
    let mut n_iterations = 0;

    for iter in 0..max_iter {
        let psi_y = score(&y);
        let mut psi_dy_mean = score_der(&psi_y);
        let mut g = gradient(&y, &psi_y);

        // Estimate the kurtosis sign of each running source. Signs stay
        // constant between restarts; a change restarts the quasi-Newton
        // state below, since it switches the objective.
        signs = Array1::from_shape_fn(n, |i| {
            if psi_dy_mean[i] - g[[i, i]] >= 0.0 {
                1.0
            } else {
                -1.0
            }
        });
        let sign_change = iter > 0 && signs != old_signs;
        old_signs = signs.clone();

        // The gradient of the signed loss carries the signs row-wise, and so
        // does the curvature term; this keeps the Hessian approximation
        // positive at the solution for sub-Gaussian sources too.
        for i in 0..n {
            let sign = signs[i];
            psi_dy_mean[i] *= sign;
            g.row_mut(i).mapv_inplace(|v| v * sign);
        }

        let g_skew = skew_symmetric(&g);
        gradient_norm = frobenius_norm(&g_skew);
        if gradient_norm < tol {
            converged = true;
            break;
        }
        n_iterations = iter + 1;

        if sign_change {
            // The objective changed under us: the cached loss and every
            // stored curvature pair refer to the old signs.
            current_loss = None;
            memory.clear();
            g_skew_old = None;
            pending_step = None;
        }

        // Complete the previous iteration's history record now that the new
        // gradient is known.
        if let (Some(step), Some(prev)) = (pending_step.take(), g_skew_old.as_ref()) {
            memory.push(step, &g_skew - prev);
        }
        g_skew_old = Some(g_skew.clone());

        let mut h = proj_hessian_approx(&psi_dy_mean, &g);
        regularize_hessian(&mut h, lambda_min);

        let mut direction = lbfgs_direction(&g_skew, &h, &memory);
        let mut result = line_search(&y, &signs, &direction, current_loss, ls_tries);

        if !result.success {
            // The quasi-Newton direction stalled; drop the history and retry
            // with the plain preconditioned gradient.
            memory.clear();
            direction = -solve_hessian(&g_skew, &h);
            result = line_search(&y, &signs, &direction, current_loss, ls_tries);

            if !result.success {
                // No decreasing step exists at any tried scale. A failed
                // candidate is never applied; stop with the current state.
                break;
            }
        }

        let step = direction * result.alpha;
        w = matrix_exp(&step).dot(&w);
        y = result.y;
        current_loss = Some(result.loss);
        pending_step = Some(step);

        if verbose {
            println!(
                "iteration {}, gradient norm = {:.4e}, loss = {:.4e}",
                iter + 1,
                gradient_norm,
                result.loss
            );
        }
    }

    let info = CoreInfo {
        converged,
        gradient_norm,
        n_iterations,
        signs,
    };

    (y, w, info)
}
