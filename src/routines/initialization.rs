//! Starting point for the solver
//!
//! Every target column starts at the simplex vertex of its best-correlated
//! dictionary column.

use faer::{Mat, MatRef};

use crate::error::{Degeneracy, SimplexError};
use crate::routines::settings::DegeneratePolicy;

/// A centered column whose norm is below this fraction of its raw norm is treated as constant
const CENTERED_EPS: f64 = 1e-10;
/// Scores at or below this magnitude count as zero correlation
const SCORE_EPS: f64 = 1e-12;

struct ColumnStats {
    centered: Mat<f64>,
    centered_norms: Vec<f64>,
    norms: Vec<f64>,
}

impl ColumnStats {
    fn new(matrix: MatRef<'_, f64>) -> Self {
        let (nrows, ncols) = (matrix.nrows(), matrix.ncols());
        let means: Vec<f64> = (0..ncols)
            .map(|j| matrix.col(j).iter().sum::<f64>() / nrows as f64)
            .collect();
        let centered = Mat::from_fn(nrows, ncols, |i, j| matrix[(i, j)] - means[j]);

        let norms: Vec<f64> = (0..ncols)
            .map(|j| matrix.col(j).iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect();
        let centered_norms = (0..ncols)
            .map(|j| {
                let norm = centered.col(j).iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm <= CENTERED_EPS * norms[j] {
                    0.0
                } else {
                    norm
                }
            })
            .collect();

        ColumnStats {
            centered,
            centered_norms,
            norms,
        }
    }
}

/// Correlation between every dictionary column and every target column, `k x n`
///
/// Pearson correlation where both columns vary. When centering leaves either
/// column with no variation (a constant column, or a single feature row) the
/// uncentered correlation (cosine similarity) is used for that pair.
/// Pairs involving an all-zero column score 0.
pub fn correlation(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> Mat<f64> {
    let stats_a = ColumnStats::new(a);
    let stats_b = ColumnStats::new(b);

    let centered_dots = stats_a.centered.as_ref().transpose() * stats_b.centered.as_ref();
    let raw_dots = a.transpose() * b;

    Mat::from_fn(a.ncols(), b.ncols(), |i, j| {
        let (ca, cb) = (stats_a.centered_norms[i], stats_b.centered_norms[j]);
        let (na, nb) = (stats_a.norms[i], stats_b.norms[j]);
        if ca > 0.0 && cb > 0.0 {
            centered_dots[(i, j)] / (ca * cb)
        } else if na > 0.0 && nb > 0.0 {
            raw_dots[(i, j)] / (na * nb)
        } else {
            0.0
        }
    })
}

/// Build the initial `k x n` coefficient matrix
///
/// Column `j` is the unit vector of the dictionary column with the highest
/// correlation to target `j` (the first one on ties). Columns with zero
/// correlation to every dictionary column fail under [DegeneratePolicy::Strict]
/// and start uniform under [DegeneratePolicy::Uniform].
///
/// Returns the matrix and the indices of the columns initialized uniformly.
pub fn initialize(
    a: MatRef<'_, f64>,
    b: MatRef<'_, f64>,
    policy: DegeneratePolicy,
) -> Result<(Mat<f64>, Vec<usize>), SimplexError> {
    let scores = correlation(a, b);
    let (k, n) = (scores.nrows(), scores.ncols());

    let mut x = Mat::<f64>::zeros(k, n);
    let mut uniform = Vec::new();

    for j in 0..n {
        let column = scores.col(j);
        let strongest = column.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));

        if strongest <= SCORE_EPS {
            match policy {
                DegeneratePolicy::Strict => {
                    return Err(SimplexError::DegenerateInput {
                        column: j,
                        reason: Degeneracy::ZeroCorrelation,
                    })
                }
                DegeneratePolicy::Uniform => {
                    for i in 0..k {
                        x[(i, j)] = 1.0 / k as f64;
                    }
                    uniform.push(j);
                    continue;
                }
            }
        }

        let mut best = 0;
        for i in 1..k {
            if scores[(i, j)] > scores[(best, j)] {
                best = i;
            }
        }
        x[(best, j)] = 1.0;
    }

    if !uniform.is_empty() {
        tracing::warn!(
            "{} target column(s) have zero correlation with the dictionary and start uniform",
            uniform.len()
        );
    }

    Ok((x, uniform))
}
