//! Dense least squares solver.
//!
//! Each Levenberg–Marquardt step solves a small damped linear least-squares
//! problem of the form:
//!
//! ```text
//! minimize ‖ [J; √λ·D] δ − [−r; 0] ‖²
//! ```
//!
//! The system is tall (one row per month plus two damping rows) and only two
//! columns wide, so SVD is cheap and well-behaved even when the Jacobian is
//! close to rank deficient (e.g. a near-flat curve where σ barely matters).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly or
/// produces non-finite values.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Progressively looser tolerances for near-singular systems.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
