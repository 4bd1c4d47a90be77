//! Frank-Wolfe with away steps for simplex-constrained least squares
//!
//! Solves `min ||AX - B||` subject to every column of `X` lying on the probability simplex.
//! Each outer iteration evaluates the gradient once, then updates every column
//! independently (and in parallel) with either a forward or an away step.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use faer::{Mat, MatRef};
use rayon::prelude::*;
use rayon::ThreadPool;

use super::convergence::{has_converged, iteration_budget, mean_absolute_change, Status};
use super::direction::{self, Direction};
use super::gradient::{reconstruction_error, Evaluation, QuadraticForm};
use super::projection::project_columns;
use super::step::{direction_image, line_search, max_step};
use crate::error::SimplexError;
use crate::routines::initialization::initialize;
use crate::routines::output::iterations::{IterationLog, IterationSummary};
use crate::routines::output::Fit;
use crate::routines::settings::Settings;
use crate::structs::coefficients::Coefficients;
use crate::structs::dictionary::Dictionary;
use crate::structs::targets::Targets;
use crate::structs::{common_scale, rescale, validate_matrix};

/// Default convergence tolerance on the mean absolute change of `X`
pub const DEFAULT_TOLERANCE: f64 = 1e-16;

/// Solve `min ||AX - B||` with every column of `X` on the probability simplex.
///
/// `max_iterations = None` runs at most `k` iterations, with `k` the number of columns of `A`.
/// `tolerance` bounds the mean absolute change of `X` between iterations, see [DEFAULT_TOLERANCE].
///
/// # Errors
///
/// Fails before iterating if the row counts of `A` and `B` differ, if either is empty or
/// holds non-finite values, or if a target column is degenerate.
pub fn solve_simplex_regression(
    a: &Mat<f64>,
    b: &Mat<f64>,
    max_iterations: Option<usize>,
    tolerance: f64,
) -> Result<Mat<f64>, SimplexError> {
    let settings = Settings::builder()
        .set_max_iterations(max_iterations)
        .set_tolerance(tolerance)
        .build();

    let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;
    Ok(fit.into_coefficients().into_inner())
}

/// Outcome of updating one column in one iteration
struct ColumnUpdate {
    column: Vec<f64>,
    direction: Direction,
}

/// Configurable simplex regression solver
///
/// With `threads > 0` the dedicated thread pool is built on the first solve and reused
/// by every later solve of the same instance.
#[derive(Debug, Clone, Default)]
pub struct SimplexRegression {
    settings: Settings,
    pool: OnceLock<Arc<ThreadPool>>,
}

impl SimplexRegression {
    pub fn new(settings: Settings) -> Self {
        SimplexRegression {
            settings,
            pool: OnceLock::new(),
        }
    }

    /// Run every solve on `pool`, regardless of `threads`
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = OnceLock::from(pool);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The pool used for the per-column updates, if one has been supplied or built
    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        self.pool.get()
    }

    fn dedicated_pool(&self) -> Result<Option<Arc<ThreadPool>>, SimplexError> {
        if let Some(pool) = self.pool.get() {
            return Ok(Some(pool.clone()));
        }
        match self.settings.config.threads {
            0 => Ok(None),
            threads => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SimplexError::ThreadPool(e.to_string()))?;
                tracing::debug!("Built a thread pool with {} threads", threads);
                Ok(Some(self.pool.get_or_init(|| Arc::new(pool)).clone()))
            }
        }
    }

    pub fn solve(&self, dictionary: &Dictionary, targets: &Targets) -> Result<Fit, SimplexError> {
        self.solve_matrices(dictionary.matrix().as_ref(), targets.matrix().as_ref())
    }

    /// Solve for matrix views `a` (features x k) and `b` (features x n)
    pub fn solve_matrices(
        &self,
        a: MatRef<'_, f64>,
        b: MatRef<'_, f64>,
    ) -> Result<Fit, SimplexError> {
        self.settings.validate()?;

        if a.nrows() != b.nrows() {
            return Err(SimplexError::DimensionMismatch {
                dictionary_rows: a.nrows(),
                target_rows: b.nrows(),
            });
        }
        validate_matrix("dictionary", a)?;
        validate_matrix("targets", b)?;

        let scale = common_scale(a, b);
        let scaled_a;
        let scaled_b;
        let (a, b) = if scale == 1.0 {
            (a, b)
        } else {
            tracing::debug!("Rescaling inputs by {:e}", scale);
            scaled_a = rescale(a, scale);
            scaled_b = rescale(b, scale);
            (scaled_a.as_ref(), scaled_b.as_ref())
        };

        match self.dedicated_pool()? {
            Some(pool) => pool.install(|| self.run(a, b, scale)),
            None => self.run(a, b, scale),
        }
    }

    /// The outer loop on inputs divided by `scale`; objectives are reported unscaled
    fn run(
        &self,
        a: MatRef<'_, f64>,
        b: MatRef<'_, f64>,
        scale: f64,
    ) -> Result<Fit, SimplexError> {
        let now = Instant::now();
        let config = &self.settings.config;
        let (k, n) = (a.ncols(), b.ncols());
        let budget = iteration_budget(self.settings.convergence.max_iterations, k);
        let tolerance = self.settings.convergence.tolerance;

        tracing::info!(
            "Simplex regression: {} features, {} basis vectors, {} samples, up to {} iterations",
            a.nrows(),
            k,
            n,
            budget
        );

        let (mut x, _) = initialize(a, b, config.degenerate)?;
        let form = QuadraticForm::new(a, b);
        let mut evaluation = Evaluation::new(&form, a, b, x.as_ref());
        tracing::debug!(
            "Setup done in {:.2?}, initial objective {:.6e}",
            now.elapsed(),
            evaluation.objective() * scale
        );

        let mut log = IterationLog::new();
        let mut status = Status::MaxIterations;
        let mut delta = f64::INFINITY;
        let mut iterations = 0;

        for iteration in 0..budget {
            let updates: Vec<ColumnUpdate> = (0..n)
                .into_par_iter()
                .map(|j| self.update_column(a, &evaluation, x.as_ref(), iteration, j))
                .collect();

            let old = x.clone();
            let mut forward = 0;
            for (j, update) in updates.into_iter().enumerate() {
                if update.direction.is_forward() {
                    forward += 1;
                }
                for (i, value) in update.column.into_iter().enumerate() {
                    x[(i, j)] = value;
                }
            }

            iterations = iteration + 1;
            delta = mean_absolute_change(old.as_ref(), x.as_ref());
            evaluation = Evaluation::new(&form, a, b, x.as_ref());

            let summary = IterationSummary::new(
                iteration,
                evaluation.objective() * scale,
                delta,
                forward,
                n - forward,
            );
            tracing::debug!(
                "Iteration {}: change {:.6e}, objective {:.6e}, {} forward / {} away",
                iteration,
                delta,
                summary.objective(),
                summary.forward_steps(),
                summary.away_steps()
            );
            log.push(summary);

            if has_converged(delta, tolerance) {
                status = Status::Converged;
                break;
            }
        }

        if status == Status::MaxIterations && budget > 0 {
            tracing::warn!(
                "Reached the maximum of {} iterations (last change {:.6e})",
                budget,
                delta
            );
        }

        let fallback = project_columns(&mut x, config.degenerate)?;
        if !fallback.is_empty() {
            tracing::warn!(
                "{} column(s) had no mass left after projection and were reset to uniform",
                fallback.len()
            );
        }

        let objective = reconstruction_error(a, b, x.as_ref()) * scale;
        tracing::info!(
            "{} after {} iteration(s) in {:.2?}, objective {:.6e}",
            status,
            iterations,
            now.elapsed(),
            objective
        );

        Ok(Fit::new(
            Coefficients::new(x),
            iterations,
            status,
            delta,
            objective,
            log,
        ))
    }

    fn update_column(
        &self,
        a: MatRef<'_, f64>,
        evaluation: &Evaluation,
        x: MatRef<'_, f64>,
        iteration: usize,
        j: usize,
    ) -> ColumnUpdate {
        let g = evaluation.gradient_column(j);
        let mut column: Vec<f64> = x.col(j).iter().copied().collect();

        let direction = direction::select(&g, &column);
        let alpha_max = max_step(direction, &column);
        let alpha = self
            .settings
            .config
            .step
            .step_length(iteration, alpha_max, || {
                let image = direction_image(a, &evaluation.fitted_column(j), direction);
                line_search(&evaluation.residual_column(j), &image)
            });

        if alpha > 0.0 {
            direction.apply(&mut column, alpha);
        }

        ColumnUpdate { column, direction }
    }
}
