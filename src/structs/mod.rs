use faer::{Mat, MatRef};

use crate::error::SimplexError;

pub mod coefficients;
pub mod dictionary;
pub mod targets;

/// Check that a matrix is non-empty and only holds finite values
pub(crate) fn validate_matrix(name: &'static str, matrix: MatRef<'_, f64>) -> Result<(), SimplexError> {
    let (rows, cols) = (matrix.nrows(), matrix.ncols());
    if rows == 0 || cols == 0 {
        return Err(SimplexError::EmptyInput { name, rows, cols });
    }

    for col in 0..cols {
        for row in 0..rows {
            if !matrix[(row, col)].is_finite() {
                return Err(SimplexError::NonFiniteInput { name, row, col });
            }
        }
    }

    Ok(())
}

/// Power of two that brings the largest magnitude in `a` and `b` close to one
///
/// Dividing by a power of two is exact, and a common scale of `A` and `B` leaves the
/// minimizing `X` unchanged, while keeping `AᵀA`, `AᵀB` and the column norms finite.
pub(crate) fn common_scale(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> f64 {
    let mut max: f64 = 0.0;
    for matrix in [a, b] {
        for col in 0..matrix.ncols() {
            for row in 0..matrix.nrows() {
                max = max.max(matrix[(row, col)].abs());
            }
        }
    }
    if max == 0.0 {
        return 1.0;
    }
    let exponent = (max.log2().ceil() as i32).clamp(-1022, 1023);
    2f64.powi(exponent)
}

/// `matrix / scale`, entry by entry
pub(crate) fn rescale(matrix: MatRef<'_, f64>, scale: f64) -> Mat<f64> {
    Mat::from_fn(matrix.nrows(), matrix.ncols(), |i, j| matrix[(i, j)] / scale)
}
