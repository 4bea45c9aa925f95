//! Utility functions for evaluating separation quality.

use ndarray::Array2;

/// Permute the rows of a near-permutation matrix so its diagonal dominates,
/// optionally scaling rows to unit diagonal.
///
/// Useful for comparing `W . A` against the identity when the true mixing
/// matrix is known: ICA recovers sources only up to row permutation and
/// scaling.
pub fn permute(a: &Array2<f64>, scale: bool) -> Array2<f64> {
    let n = a.nrows();
    let mut a = a.clone();

    // Swap row pairs until every diagonal pair dominates its off-diagonal
    // counterpart.
    let mut done = false;
    while !done {
        done = true;
        for i in 0..n {
            for j in 0..i {
                let diag_sq = a[[i, i]].powi(2) + a[[j, j]].powi(2);
                let off_sq = a[[i, j]].powi(2) + a[[j, i]].powi(2);

                if diag_sq < off_sq {
                    for col in 0..a.ncols() {
                        a.swap([i, col], [j, col]);
                    }
                    done = false;
                }
            }
        }
    }

    if scale {
        for i in 0..n {
            let diag = a[[i, i]];
            if diag.abs() > 1e-10 {
                for j in 0..a.ncols() {
                    a[[i, j]] /= diag;
                }
            }
        }
    }

    a
}

/// Amari distance between an unmixing matrix and a mixing matrix.
///
/// Measures how close `W . A` is to a permutation-and-scaling matrix;
/// 0 means perfect separation, and the measure is invariant to row
/// permutation and scaling of either factor.
pub fn amari_distance(w: &Array2<f64>, a: &Array2<f64>) -> f64 {
    let p = w.dot(a);
    let n = p.nrows() as f64;

    let s = |r: &Array2<f64>| -> f64 {
        let mut sum = 0.0;
        for i in 0..r.nrows() {
            let row_sq: Vec<f64> = r.row(i).iter().map(|&x| x * x).collect();
            let row_sum: f64 = row_sq.iter().sum();
            let row_max: f64 = row_sq.iter().cloned().fold(0.0, f64::max);
            if row_max > 1e-15 {
                sum += row_sum / row_max - 1.0;
            }
        }
        sum
    };

    let p_abs = p.mapv(|x| x.abs());
    let p_abs_t = p_abs.t().to_owned();

    (s(&p_abs) + s(&p_abs_t)) / (2.0 * n)
}

/// Flip each row of `y` so its third moment is non-negative.
///
/// ICA leaves a sign ambiguity per recovered source; this picks the
/// canonical sign, making repeated runs on the same data comparable.
pub fn fix_signs(y: &mut Array2<f64>) {
    for mut row in y.outer_iter_mut() {
        let m3: f64 = row.iter().map(|&v| v * v * v).sum::<f64>() / row.len() as f64;
        if m3 < 0.0 {
            row.mapv_inplace(|v| -v);
        }
    }
}
