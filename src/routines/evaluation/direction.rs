//! Forward/away direction selection for a single column
//!
//! Both candidate directions are differences of simplex points, so moving along
//! them by at most [max_step](super::step::max_step) keeps the column on the simplex.

use serde::Serialize;

/// A feasible descent direction for one column `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// `e_vertex - x`: move mass onto `vertex`
    Forward { vertex: usize },
    /// `x - e_vertex`: move mass off the active `vertex`
    Away { vertex: usize },
}

impl Direction {
    pub fn vertex(&self) -> usize {
        match *self {
            Direction::Forward { vertex } | Direction::Away { vertex } => vertex,
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Forward { .. })
    }

    /// Entry `i` of the direction vector
    pub fn component(&self, x: &[f64], i: usize) -> f64 {
        match *self {
            Direction::Forward { vertex } => {
                if i == vertex {
                    1.0 - x[i]
                } else {
                    -x[i]
                }
            }
            Direction::Away { vertex } => {
                if i == vertex {
                    x[i] - 1.0
                } else {
                    x[i]
                }
            }
        }
    }

    /// `⟨g, d⟩`
    pub fn derivative(&self, g: &[f64], x: &[f64]) -> f64 {
        let gx = dot(g, x);
        match *self {
            Direction::Forward { vertex } => g[vertex] - gx,
            Direction::Away { vertex } => gx - g[vertex],
        }
    }

    /// `x ← x + alpha·d`
    pub fn apply(&self, x: &mut [f64], alpha: f64) {
        match *self {
            Direction::Forward { vertex } => {
                x.iter_mut().for_each(|xi| *xi *= 1.0 - alpha);
                x[vertex] += alpha;
            }
            Direction::Away { vertex } => {
                x.iter_mut().for_each(|xi| *xi *= 1.0 + alpha);
                x[vertex] -= alpha;
            }
        }
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Index of the smallest gradient entry, the first one on ties
pub fn argmin(g: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in g.iter().enumerate().skip(1) {
        if v < g[best] {
            best = i;
        }
    }
    best
}

/// Index of the largest gradient entry among the active support (`x > 0`)
///
/// This is the active vertex whose weight improves the objective the least.
/// Returns `None` if no entry is positive.
pub fn argmax_active(g: &[f64], x: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, (&gi, &xi)) in g.iter().zip(x.iter()).enumerate() {
        if xi > 0.0 && best.map_or(true, |b| gi > g[b]) {
            best = Some(i);
        }
    }
    best
}

/// Choose between the forward and the away direction for column `x` with gradient `g`
///
/// The direction with the more negative directional derivative wins; ties go to the forward step.
pub fn select(g: &[f64], x: &[f64]) -> Direction {
    let forward = Direction::Forward { vertex: argmin(g) };

    match argmax_active(g, x) {
        Some(vertex) => {
            let away = Direction::Away { vertex };
            if forward.derivative(g, x) <= away.derivative(g, x) {
                forward
            } else {
                away
            }
        }
        None => forward,
    }
}
