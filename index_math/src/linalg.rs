//! Penalized least squares
//!
//! Solves `(X'X + diag(penalties)) b = X'y` with a Cholesky factorization.
//! A zero penalty leaves a coefficient unregularized.

use crate::{MathError, Result};

/// Fit ridge-style coefficients for a row-major design matrix.
pub fn penalized_least_squares(
    design: &[Vec<f64>],
    targets: &[f64],
    penalties: &[f64],
) -> Result<Vec<f64>> {
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Design matrix has no rows".to_string(),
        ));
    }
    if design.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design rows ({}) don't match targets ({})",
            design.len(),
            targets.len()
        )));
    }

    let p = penalties.len();
    if design.iter().any(|row| row.len() != p) {
        return Err(MathError::InvalidInput(format!(
            "Every design row must have {} columns",
            p
        )));
    }

    let mut gram = vec![vec![0.0; p]; p];
    let mut rhs = vec![0.0; p];
    for (row, &y) in design.iter().zip(targets) {
        for i in 0..p {
            rhs[i] += row[i] * y;
            for j in 0..=i {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..p {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[j][i] = gram[i][j];
        }
    }

    solve_symmetric(&gram, &rhs)
}

/// Solve a symmetric positive definite system.
pub fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return Err(MathError::InvalidInput(
            "System matrix and right-hand side sizes differ".to_string(),
        ));
    }

    // A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 1e-12 || !sum.is_finite() {
                    return Err(MathError::CalculationError(format!(
                        "Matrix is singular or not positive definite at pivot {}",
                        i
                    )));
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Ok(x)
}
