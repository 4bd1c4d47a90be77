//! Simplex-constrained least squares
//!
//! Finds `X >= 0` with every column summing to one that minimizes `||AX - B||_F`,
//! using the Frank-Wolfe method with away steps. Each column of `B` is expressed as a
//! convex combination of the columns of `A`.
//!
//! ```no_run
//! use simplexreg::prelude::*;
//! use faer::Mat;
//!
//! let a = Mat::from_fn(3, 3, |i, j| if i == j { 1.0 } else { 0.0 });
//! let b = Mat::from_fn(3, 1, |i, _| [0.2, 0.5, 0.3][i]);
//! let x = solve_simplex_regression(&a, &b, Some(50), DEFAULT_TOLERANCE)?;
//! assert_eq!(x.ncols(), 1);
//! # Ok::<(), SimplexError>(())
//! ```

pub mod error;
pub mod routines {
    pub mod evaluation {
        pub mod convergence;
        pub mod direction;
        pub mod frank_wolfe;
        pub mod gradient;
        pub mod projection;
        pub mod step;
    }
    // Routines for initialization
    pub mod initialization;
    // Routines for logging
    pub mod logger;
    // Routines for output
    pub mod output;
    // Routines for settings
    pub mod settings;
}
pub mod structs;

pub use error::SimplexError;
pub use routines::evaluation::frank_wolfe::{
    solve_simplex_regression, SimplexRegression, DEFAULT_TOLERANCE,
};

pub mod prelude {
    pub use crate::error::{Degeneracy, SimplexError};
    pub use crate::routines::evaluation::convergence::Status;
    pub use crate::routines::evaluation::frank_wolfe::{
        solve_simplex_regression, SimplexRegression, DEFAULT_TOLERANCE,
    };
    pub use crate::routines::evaluation::step::StepPolicy;
    pub use crate::routines::logger::setup_log;
    pub use crate::routines::output::iterations::{IterationLog, IterationSummary};
    pub use crate::routines::output::Fit;
    pub use crate::routines::settings::{self, DegeneratePolicy, Settings};
    pub use crate::structs::coefficients::Coefficients;
    pub use crate::structs::dictionary::Dictionary;
    pub use crate::structs::targets::Targets;
}
