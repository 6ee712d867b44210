//! Least squares solvers.
//!
//! The forecasting model is linear in its coefficients, so each fit is a
//! single regression problem of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ_j λ_j β_j^2
//! ```
//!
//! Implementation choices:
//! - The L2 penalty is applied by appending `sqrt(λ_j) · e_j` rows with a zero
//!   target, which turns the problem back into plain least squares.
//! - We use SVD to solve the least-squares problem robustly even when the design
//!   matrix is tall or rank-deficient (e.g. daily Fourier columns on
//!   daily-sampled data are collinear with the intercept).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve an L2-regularized least squares problem.
///
/// `penalties[j]` is the ridge weight `λ_j` for column `j` (0 = unpenalized).
///
/// # Panics
/// Panics if `penalties.len() != x.ncols()` or `y.len() != x.nrows()`.
pub fn solve_regularized(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    assert_eq!(penalties.len(), x.ncols(), "one penalty per column");
    assert_eq!(y.len(), x.nrows(), "one target per row");

    let penalized: Vec<(usize, f64)> = penalties
        .iter()
        .enumerate()
        .filter(|(_, lambda)| **lambda > 0.0)
        .map(|(j, lambda)| (j, lambda.sqrt()))
        .collect();

    if penalized.is_empty() {
        return solve_least_squares(x, y);
    }

    let n = x.nrows();
    let rows = n + penalized.len();
    let mut xa = DMatrix::<f64>::zeros(rows, x.ncols());
    let mut ya = DVector::<f64>::zeros(rows);

    xa.rows_mut(0, n).copy_from(x);
    ya.rows_mut(0, n).copy_from(y);
    for (offset, (j, weight)) in penalized.into_iter().enumerate() {
        xa[(n + offset, j)] = weight;
    }

    solve_least_squares(&xa, &ya)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn zero_penalties_match_plain_least_squares() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_regularized(&x, &y, &[0.0, 0.0]).unwrap();
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn penalty_shrinks_coefficient() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let free = solve_regularized(&x, &y, &[0.0, 0.0]).unwrap();
        let shrunk = solve_regularized(&x, &y, &[0.0, 100.0]).unwrap();
        assert!(shrunk[1].abs() < free[1].abs());
        assert!(shrunk[1] > 0.0);
    }

    #[test]
    fn penalty_makes_collinear_system_solvable() {
        // Second column duplicates the intercept on the data rows.
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let y = DVector::from_row_slice(&[4.0, 4.0]);

        let beta = solve_regularized(&x, &y, &[0.0, 1.0]).unwrap();
        assert!((beta[0] + beta[1] - 4.0).abs() < 1e-6);
    }
}
