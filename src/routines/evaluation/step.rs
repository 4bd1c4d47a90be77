use faer::MatRef;
use serde::{Deserialize, Serialize};

use super::direction::{dot, Direction};

/// Below this, `1 - x_i` is treated as zero when bounding an away step
const VERTEX_EPS: f64 = 1e-12;

/// Step-size policy used for every column and iteration of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// `2 / (t + 2)` for the zero-based iteration `t`
    #[default]
    Diminishing,
    /// `2 / (t + 2)`, capped at the line-search minimizer so the objective never increases
    CappedDiminishing,
    /// Closed-form minimizer of the objective along the chosen direction
    LineSearch,
}

impl StepPolicy {
    /// Step length along `direction`, clipped to `[0, alpha_max]`
    ///
    /// `exact` yields the line-search minimizer and is only evaluated when the policy needs it.
    pub fn step_length(
        &self,
        iteration: usize,
        alpha_max: f64,
        exact: impl FnOnce() -> f64,
    ) -> f64 {
        let alpha = match self {
            StepPolicy::Diminishing => diminishing(iteration),
            StepPolicy::CappedDiminishing => diminishing(iteration).min(exact()),
            StepPolicy::LineSearch => exact(),
        };
        alpha.min(alpha_max).max(0.0)
    }
}

pub fn diminishing(iteration: usize) -> f64 {
    2.0 / (iteration as f64 + 2.0)
}

/// Largest step along `direction` that keeps `x` on the simplex
///
/// A forward step is bounded by 1. An away step from vertex `i` is bounded by
/// `x_i / (1 - x_i)`; at a pure vertex the away direction vanishes and the bound is 0.
pub fn max_step(direction: Direction, x: &[f64]) -> f64 {
    match direction {
        Direction::Forward { .. } => 1.0,
        Direction::Away { vertex } => {
            let xi = x[vertex];
            let rest = 1.0 - xi;
            if rest <= VERTEX_EPS {
                0.0
            } else {
                xi / rest
            }
        }
    }
}

/// `A·d` for one column, using the fitted column `ax = A·x`
pub fn direction_image(a: MatRef<'_, f64>, ax: &[f64], direction: Direction) -> Vec<f64> {
    match direction {
        Direction::Forward { vertex } => (0..a.nrows()).map(|f| a[(f, vertex)] - ax[f]).collect(),
        Direction::Away { vertex } => (0..a.nrows()).map(|f| ax[f] - a[(f, vertex)]).collect(),
    }
}

/// Minimizer of `½||r + α·Ad||²` over `α ≥ 0`, where `r = Ax - b`
///
/// Returns 0 when the objective is flat along `d` (`Ad = 0`).
pub fn line_search(residual: &[f64], image: &[f64]) -> f64 {
    let curvature = dot(image, image);
    if curvature <= 0.0 {
        return 0.0;
    }
    (-dot(residual, image) / curvature).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::Mat;

    #[test]
    fn test_diminishing_schedule() {
        assert_eq!(diminishing(0), 1.0);
        assert!((diminishing(1) - 2.0 / 3.0).abs() < 1e-15);
        assert_eq!(diminishing(2), 0.5);
    }

    #[test]
    fn test_max_step_away_from_pure_vertex_is_zero() {
        let x = [0.0, 1.0];
        assert_eq!(max_step(Direction::Away { vertex: 1 }, &x), 0.0);
        assert_eq!(max_step(Direction::Forward { vertex: 0 }, &x), 1.0);
    }

    #[test]
    fn test_max_step_away_drains_vertex_exactly() {
        let x = [0.25, 0.75];
        let alpha = max_step(Direction::Away { vertex: 0 }, &x);
        assert!((alpha - 1.0 / 3.0).abs() < 1e-15);

        let mut moved = x.to_vec();
        Direction::Away { vertex: 0 }.apply(&mut moved, alpha);
        assert!(moved[0].abs() < 1e-15);
        assert!((moved[1] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_line_search_flat_direction() {
        assert_eq!(line_search(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_line_search_minimizer() {
        // r = [1, -1], Ad = [-1, 1]: ½||r + αAd||² is minimized at α = 1
        assert!((line_search(&[1.0, -1.0], &[-1.0, 1.0]) - 1.0).abs() < 1e-15);
        // ascent direction is never taken
        assert_eq!(line_search(&[1.0, -1.0], &[1.0, -1.0]), 0.0);
    }

    #[test]
    fn test_direction_image() {
        let a = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let ax = [1.0, 0.0];
        assert_eq!(
            direction_image(a.as_ref(), &ax, Direction::Forward { vertex: 1 }),
            vec![-1.0, 1.0]
        );
        assert_eq!(
            direction_image(a.as_ref(), &ax, Direction::Away { vertex: 0 }),
            vec![0.0, 0.0]
        );
    }

    #[test]
    fn test_step_length_policies() {
        let plain = StepPolicy::Diminishing;
        assert_eq!(plain.step_length(0, 1.0, || 0.1), 1.0);
        assert_eq!(plain.step_length(2, 0.2, || 0.9), 0.2);

        let capped = StepPolicy::CappedDiminishing;
        assert_eq!(capped.step_length(0, 1.0, || 0.1), 0.1);
        assert_eq!(capped.step_length(2, 1.0, || 0.9), 0.5);
        assert_eq!(capped.step_length(2, 0.2, || 0.9), 0.2);

        let exact = StepPolicy::LineSearch;
        assert_eq!(exact.step_length(5, 1.0, || 3.0), 1.0);
        assert_eq!(exact.step_length(5, 1.0, || 0.3), 0.3);
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&StepPolicy::LineSearch).unwrap();
        assert_eq!(json, "\"line_search\"");
        let capped: StepPolicy = serde_json::from_str("\"capped_diminishing\"").unwrap();
        assert_eq!(capped, StepPolicy::CappedDiminishing);
        let parsed: StepPolicy = serde_json::from_str("\"diminishing\"").unwrap();
        assert_eq!(parsed, StepPolicy::Diminishing);
    }
}
