use faer::Mat;
use faer_ext::IntoFaer;
use ndarray::{Array2, ArrayView2};

use crate::error::SimplexError;

/// The dictionary matrix `A`
///
/// Each row is a feature and each column a basis vector (archetype).
/// Target columns are expressed as convex combinations of these columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    matrix: Mat<f64>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary { matrix: Mat::new() }
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.matrix
    }

    /// Number of feature rows
    pub fn nfeatures(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of basis vectors, `k`
    pub fn narchetypes(&self) -> usize {
        self.matrix.ncols()
    }

    /// Copy of the basis vector at `index`
    pub fn archetype(&self, index: usize) -> Vec<f64> {
        self.matrix.col(index).iter().copied().collect()
    }

    /// Check that the dictionary is non-empty and finite
    pub fn validate(&self) -> Result<(), SimplexError> {
        super::validate_matrix("dictionary", self.matrix.as_ref())
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Mat<f64>> for Dictionary {
    fn from(matrix: Mat<f64>) -> Self {
        Dictionary { matrix }
    }
}

impl From<Array2<f64>> for Dictionary {
    fn from(array: Array2<f64>) -> Self {
        let matrix = array.view().into_faer().to_owned();
        Dictionary { matrix }
    }
}

impl From<&Array2<f64>> for Dictionary {
    fn from(array: &Array2<f64>) -> Self {
        let matrix = array.view().into_faer().to_owned();
        Dictionary { matrix }
    }
}

impl From<ArrayView2<'_, f64>> for Dictionary {
    fn from(array_view: ArrayView2<'_, f64>) -> Self {
        let matrix = array_view.into_faer().to_owned();
        Dictionary { matrix }
    }
}
