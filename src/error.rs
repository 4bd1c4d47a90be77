use std::fmt;
use thiserror::Error;

/// Errors raised by the simplex regression solver.
///
/// Non-convergence is not an error; see [crate::routines::evaluation::convergence::Status].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimplexError {
    /// The dictionary and the targets do not share the feature dimension.
    #[error("dictionary has {dictionary_rows} feature rows, targets have {target_rows}")]
    DimensionMismatch {
        dictionary_rows: usize,
        target_rows: usize,
    },

    /// One of the input matrices has no rows or no columns.
    #[error("{name} must have at least one row and one column, got {rows}x{cols}")]
    EmptyInput {
        name: &'static str,
        rows: usize,
        cols: usize,
    },

    /// NaN or infinity found during input validation.
    #[error("{name} contains a non-finite value at ({row}, {col})")]
    NonFiniteInput {
        name: &'static str,
        row: usize,
        col: usize,
    },

    /// A column that cannot be placed on the simplex under the strict policy.
    #[error("target column {column} is degenerate: {reason}")]
    DegenerateInput { column: usize, reason: Degeneracy },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("could not build a thread pool: {0}")]
    ThreadPool(String),
}

/// Why a column was flagged as degenerate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// Every dictionary column has zero correlation with the target column
    ZeroCorrelation,
    /// The column has no mass left after clamping
    ZeroMass,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::ZeroCorrelation => write!(f, "zero correlation with every dictionary column"),
            Degeneracy::ZeroMass => write!(f, "column sums to zero after clamping"),
        }
    }
}
