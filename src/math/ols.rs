//! Ordinary least squares solver.
//!
//! The forecaster estimates autoregressive coefficients by conditional least
//! squares, i.e. it repeatedly solves small regressions of the form:
//!
//! ```text
//! minimize Σ (y_t - x_t^T φ)^2,   x_t = [y_{t-1}, ..., y_{t-p}]
//! ```
//!
//! Implementation choices:
//! - We use SVD so the problem is solved robustly even when the design matrix is
//!   tall (many more months than lags) or close to rank-deficient.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is tiny (a handful of lags), so SVD cost is
//!   negligible next to the network fetch.

use nalgebra::{DMatrix, DVector};

/// Coefficients plus the residual sum of squares of a least squares fit.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub coefficients: DVector<f64>,
    pub sse: f64,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() < x.ncols() {
        return None;
    }

    let svd = x.clone().svd(true, true);

    // Lagged inflation columns are strongly correlated, so accept progressively
    // looser singular-value cutoffs before giving up.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve and report the residual sum of squares.
pub fn fit_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquaresFit> {
    let coefficients = solve_least_squares(x, y)?;
    let residuals = y - x * &coefficients;
    let sse = residuals.norm_squared();
    if !sse.is_finite() {
        return None;
    }
    Some(LeastSquaresFit { coefficients, sse })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let fit = fit_least_squares(&x, &y).unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-10);
        assert!((fit.coefficients[1] - 3.0).abs() < 1e-10);
        assert!(fit.sse < 1e-18);
    }

    #[test]
    fn underdetermined_system_is_rejected() {
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
