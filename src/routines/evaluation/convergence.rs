use faer::MatRef;
use serde::{Deserialize, Serialize};

/// Represents how the solver terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The change in `X` fell below the tolerance
    Converged,
    /// The iteration budget was exhausted; the current `X` is returned
    MaxIterations,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Converged => write!(f, "Converged"),
            Status::MaxIterations => write!(f, "Maximum iterations reached"),
        }
    }
}

/// Iteration budget: `None` falls back to the number of basis vectors
pub fn iteration_budget(max_iterations: Option<usize>, narchetypes: usize) -> usize {
    max_iterations.unwrap_or(narchetypes)
}

/// Mean absolute difference over all entries of two equally sized matrices
pub fn mean_absolute_change(old: MatRef<'_, f64>, new: MatRef<'_, f64>) -> f64 {
    let (nrows, ncols) = (new.nrows(), new.ncols());
    if nrows == 0 || ncols == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for j in 0..ncols {
        for i in 0..nrows {
            total += (old[(i, j)] - new[(i, j)]).abs();
        }
    }
    total / (nrows * ncols) as f64
}

pub fn has_converged(change: f64, tolerance: f64) -> bool {
    change < tolerance
}
