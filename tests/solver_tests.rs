use anyhow::Result;
use faer::Mat;
use ndarray::array;
use simplexreg::prelude::*;

fn identity(n: usize) -> Mat<f64> {
    Mat::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
}

/// Full column rank dictionary, so the coefficients of an exact mixture are unique
fn dictionary() -> Mat<f64> {
    Mat::from_fn(4, 3, |i, j| if i == j || i == 3 { 1.0 } else { 0.0 })
}

fn mixtures() -> Mat<f64> {
    let columns = [[0.2, 0.5, 0.3], [0.6, 0.4, 0.0], [0.0, 0.0, 1.0]];
    Mat::from_fn(3, 3, |i, j| columns[j][i])
}

fn max_difference(a: &Mat<f64>, b: &Mat<f64>) -> f64 {
    let mut max: f64 = 0.0;
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            max = max.max((a[(i, j)] - b[(i, j)]).abs());
        }
    }
    max
}

/// Vertex target is already optimal after initialization
#[test]
fn test_vertex_target() -> Result<()> {
    let a = identity(2);
    let b = Mat::from_fn(2, 1, |i, _| [1.0, 0.0][i]);

    let x = solve_simplex_regression(&a, &b, None, DEFAULT_TOLERANCE)?;
    assert_eq!(x[(0, 0)], 1.0);
    assert_eq!(x[(1, 0)], 0.0);
    Ok(())
}

/// Midpoint target on the identity dictionary, reached in one capped or exact step
#[test]
fn test_midpoint_target() -> Result<()> {
    let a = identity(2);
    let b = Mat::from_fn(2, 1, |_, _| 0.5);

    for policy in [StepPolicy::CappedDiminishing, StepPolicy::LineSearch] {
        let settings = Settings::builder().set_step_policy(policy).build();
        let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;
        assert!((fit.coefficients()[(0, 0)] - 0.5).abs() < 1e-12, "{:?}", policy);
        assert!((fit.coefficients()[(1, 0)] - 0.5).abs() < 1e-12, "{:?}", policy);
    }
    Ok(())
}

/// The plain diminishing schedule oscillates towards the midpoint
#[test]
fn test_midpoint_target_plain_diminishing_steps() -> Result<()> {
    let a = identity(2);
    let b = Mat::from_fn(2, 1, |_, _| 0.5);

    let x = solve_simplex_regression(&a, &b, Some(200), DEFAULT_TOLERANCE)?;
    assert!((x[(0, 0)] - 0.5).abs() < 1e-2);

    let settings = Settings::builder().set_max_iterations(Some(200)).build();
    let fit = SimplexRegression::new(settings).solve(&Dictionary::from(a), &Targets::from(b))?;
    assert_eq!(fit.status(), Status::MaxIterations);
    assert_eq!(fit.iterations(), 200);
    assert!((fit.coefficients()[(0, 0)] - 0.5).abs() < 1e-2);
    assert!(fit.coefficients().is_feasible(1e-12));
    Ok(())
}

#[test]
fn test_dimension_mismatch() {
    let a = Mat::<f64>::from_fn(3, 2, |i, j| (i + j) as f64);
    let b = Mat::<f64>::from_fn(4, 1, |i, _| i as f64);

    let err = solve_simplex_regression(&a, &b, None, DEFAULT_TOLERANCE).unwrap_err();
    assert_eq!(
        err,
        SimplexError::DimensionMismatch {
            dictionary_rows: 3,
            target_rows: 4
        }
    );
}

#[test]
fn test_zero_iterations_returns_feasible_start() -> Result<()> {
    let a = dictionary();
    let b = &a * &mixtures();

    let settings = Settings::builder().set_max_iterations(Some(0)).build();
    let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;

    assert_eq!(fit.iterations(), 0);
    assert!(fit.log().is_empty());
    assert!(fit.coefficients().is_feasible(0.0));
    assert_eq!(fit.coefficients().nsamples(), 3);
    assert_eq!(fit.coefficients().narchetypes(), 3);
    Ok(())
}

#[test]
fn test_recovers_exact_mixtures() -> Result<()> {
    let a = dictionary();
    let p = mixtures();
    let b = &a * &p;

    for policy in [StepPolicy::CappedDiminishing, StepPolicy::LineSearch] {
        let settings = Settings::builder()
            .set_step_policy(policy)
            .set_max_iterations(Some(500))
            .build();
        let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;

        let x = fit.coefficients().matrix();
        assert!(max_difference(x, &p) < 1e-6, "{:?}: {:?}", policy, x);
        assert!(fit.objective() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_converges_before_budget() -> Result<()> {
    let a = dictionary();
    let b = &a * &mixtures();
    let settings = Settings::builder()
        .set_step_policy(StepPolicy::LineSearch)
        .set_max_iterations(Some(500))
        .build();

    let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;
    assert!(fit.converged());
    assert!(fit.iterations() < 500);
    assert!(fit.delta() < DEFAULT_TOLERANCE);
    assert_eq!(fit.log().len(), fit.iterations());
    Ok(())
}

#[test]
fn test_repeated_solves_are_identical() -> Result<()> {
    let a = dictionary();
    let b = Mat::from_fn(4, 5, |i, j| 0.3 + ((i * 7 + j * 3) % 5) as f64 * 0.2);

    let first = solve_simplex_regression(&a, &b, Some(25), DEFAULT_TOLERANCE)?;
    let second = solve_simplex_regression(&a, &b, Some(25), DEFAULT_TOLERANCE)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_thread_count_does_not_change_result() -> Result<()> {
    let a = dictionary();
    let b = Mat::from_fn(4, 16, |i, j| 0.3 + ((i * 7 + j * 3) % 5) as f64 * 0.2);

    let solve = |threads: usize| {
        let settings = Settings::builder()
            .set_threads(threads)
            .set_max_iterations(Some(30))
            .build();
        SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())
    };

    let single = solve(1)?;
    let many = solve(4)?;
    assert_eq!(single.iterations(), many.iterations());
    assert!(
        max_difference(single.coefficients().matrix(), many.coefficients().matrix()) < 1e-12
    );
    Ok(())
}

#[test]
fn test_ndarray_inputs() -> Result<()> {
    let a = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    let b = array![[0.25], [0.75], [1.0]];

    let settings = Settings::builder()
        .set_step_policy(StepPolicy::LineSearch)
        .set_max_iterations(Some(100))
        .build();
    let fit = SimplexRegression::new(settings).solve(&Dictionary::from(&a), &Targets::from(b.view()))?;

    let x = fit.coefficients().to_ndarray();
    assert_eq!(x.dim(), (2, 1));
    assert!((x[[0, 0]] - 0.25).abs() < 1e-8);
    assert!((x[[1, 0]] - 0.75).abs() < 1e-8);
    Ok(())
}

#[test]
fn test_zero_target_is_rejected_by_default() {
    let a = identity(3);
    let b = Mat::from_fn(3, 2, |i, j| if j == 0 { [0.1, 0.2, 0.7][i] } else { 0.0 });

    let err = solve_simplex_regression(&a, &b, None, DEFAULT_TOLERANCE).unwrap_err();
    assert_eq!(
        err,
        SimplexError::DegenerateInput {
            column: 1,
            reason: Degeneracy::ZeroCorrelation
        }
    );
}

#[test]
fn test_zero_target_with_uniform_policy() -> Result<()> {
    let a = identity(3);
    let b = Mat::from_fn(3, 2, |i, j| if j == 0 { [0.1, 0.2, 0.7][i] } else { 0.0 });

    let settings = Settings::builder()
        .set_degenerate_policy(DegeneratePolicy::Uniform)
        .set_max_iterations(Some(50))
        .build();
    let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;
    assert!(fit.coefficients().is_feasible(1e-12));
    Ok(())
}

/// Entries whose squares overflow are rescaled, not reported as degenerate
#[test]
fn test_large_finite_inputs() -> Result<()> {
    let a = Mat::from_fn(3, 2, |i, j| match (i, j) {
        (0, 0) | (1, 1) => 2e155,
        _ => 1.0,
    });
    let b = Mat::from_fn(3, 1, |i, _| a[(i, 0)]);

    for policy in [DegeneratePolicy::Strict, DegeneratePolicy::Uniform] {
        for step in [StepPolicy::CappedDiminishing, StepPolicy::LineSearch] {
            let settings = Settings::builder()
                .set_degenerate_policy(policy)
                .set_step_policy(step)
                .build();
            let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;

            assert_eq!(fit.coefficients().column(0), vec![1.0, 0.0], "{:?}", step);
            assert!(fit.objective().is_finite());
            assert!(fit.objective() <= 1e-12 * 2e155);
        }
    }
    Ok(())
}

/// Entries whose squares underflow still correlate and are recovered
#[test]
fn test_tiny_inputs() -> Result<()> {
    let a = Mat::from_fn(2, 2, |i, j| if i == j { 1e-170 } else { 0.0 });
    let b = Mat::from_fn(2, 1, |i, _| [0.3e-170, 0.7e-170][i]);

    let settings = Settings::builder()
        .set_step_policy(StepPolicy::LineSearch)
        .set_max_iterations(Some(50))
        .build();
    let fit = SimplexRegression::new(settings).solve_matrices(a.as_ref(), b.as_ref())?;

    let x = fit.coefficients().column(0);
    assert!((x[0] - 0.3).abs() < 1e-9, "{:?}", x);
    assert!((x[1] - 0.7).abs() < 1e-9, "{:?}", x);
    Ok(())
}

#[test]
fn test_non_finite_input() {
    let a = identity(2);
    let b = Mat::from_fn(2, 1, |i, _| if i == 1 { f64::NAN } else { 0.5 });

    let err = solve_simplex_regression(&a, &b, None, DEFAULT_TOLERANCE).unwrap_err();
    assert_eq!(
        err,
        SimplexError::NonFiniteInput {
            name: "targets",
            row: 1,
            col: 0
        }
    );
}

#[test]
fn test_empty_input() {
    let a = Mat::<f64>::zeros(2, 0);
    let b = Mat::from_fn(2, 1, |_, _| 0.5);

    let err = solve_simplex_regression(&a, &b, None, DEFAULT_TOLERANCE).unwrap_err();
    assert!(matches!(
        err,
        SimplexError::EmptyInput {
            name: "dictionary",
            ..
        }
    ));
}

#[test]
fn test_write_outputs() -> Result<()> {
    let folder = std::env::temp_dir().join("simplexreg_solver_outputs");
    let folder = folder.to_string_lossy().to_string();

    let settings = Settings::builder()
        .set_output_path(folder.clone())
        .set_write_outputs(true)
        .set_max_iterations(Some(10))
        .build();

    let a = dictionary();
    let b = &a * &mixtures();
    let fit = SimplexRegression::new(settings.clone()).solve_matrices(a.as_ref(), b.as_ref())?;
    fit.write_outputs(&settings)?;

    let folder = std::path::Path::new(&folder);
    assert!(folder.join("coefficients.csv").exists());
    assert!(folder.join("iterations.csv").exists());
    assert!(folder.join("settings.json").exists());

    let iterations = std::fs::read_to_string(folder.join("iterations.csv"))?;
    assert_eq!(iterations.lines().count(), fit.iterations() + 1);
    Ok(())
}
