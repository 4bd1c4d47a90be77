use faer::Mat;
use faer_ext::IntoNdarray;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// The coefficient matrix `X` returned by the solver.
///
/// `X` has one row per basis vector and one column per target sample.
/// Every column is a point on the probability simplex once the solver returns.
/// It is a thin wrapper around [faer::Mat<f64>] to provide additional functionality and context
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    matrix: Mat<f64>,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            matrix: Mat::new(),
        }
    }
}

impl Coefficients {
    pub fn new(matrix: Mat<f64>) -> Self {
        Self { matrix }
    }

    /// Build a `k` x `n` matrix from its columns.
    ///
    /// Returns `None` if the columns do not all have the same length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Option<Self> {
        let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
        if columns.iter().any(|c| c.len() != nrows) {
            return None;
        }
        let matrix = Mat::from_fn(nrows, columns.len(), |i, j| columns[j][i]);
        Some(Self { matrix })
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.matrix
    }

    pub fn into_inner(self) -> Mat<f64> {
        self.matrix
    }

    /// Number of basis vectors, `k`
    pub fn narchetypes(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of target samples, `n`
    pub fn nsamples(&self) -> usize {
        self.matrix.ncols()
    }

    /// Copy of the coefficients for sample `index`
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.matrix.col(index).iter().copied().collect()
    }

    pub fn columns(&self) -> Vec<Vec<f64>> {
        (0..self.nsamples()).map(|j| self.column(j)).collect()
    }

    pub fn column_sums(&self) -> Vec<f64> {
        (0..self.nsamples())
            .map(|j| self.matrix.col(j).iter().sum())
            .collect()
    }

    /// Whether every column is non-negative, bounded by one, and sums to one within `tol`
    pub fn is_feasible(&self, tol: f64) -> bool {
        self.matrix.col_iter().all(|col| {
            let in_bounds = col.iter().all(|&v| (-tol..=1.0 + tol).contains(&v));
            let sum: f64 = col.iter().sum();
            in_bounds && (sum - 1.0).abs() <= tol
        })
    }

    /// Index of the dominant basis vector for every sample
    pub fn hard_assignments(&self) -> Vec<usize> {
        self.matrix
            .col_iter()
            .map(|col| {
                col.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
                        if v > best.1 {
                            (i, v)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }

    pub fn to_ndarray(&self) -> Array2<f64> {
        self.matrix.as_ref().into_ndarray().to_owned()
    }
}

/// Serialized as a list of columns, one simplex point per sample
impl Serialize for Coefficients {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.columns().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coefficients {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let columns = Vec::<Vec<f64>>::deserialize(deserializer)?;
        Self::from_columns(&columns)
            .ok_or_else(|| serde::de::Error::custom("all columns must have the same length"))
    }
}

impl From<Mat<f64>> for Coefficients {
    fn from(matrix: Mat<f64>) -> Self {
        Self { matrix }
    }
}

impl Index<(usize, usize)> for Coefficients {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.matrix[index]
    }
}

impl IndexMut<(usize, usize)> for Coefficients {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.matrix[index]
    }
}
