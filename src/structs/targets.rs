use faer::Mat;
use faer_ext::IntoFaer;
use ndarray::{Array2, ArrayView2};

use crate::error::SimplexError;

/// The target matrix `B`, one sample per column
#[derive(Debug, Clone, PartialEq)]
pub struct Targets {
    matrix: Mat<f64>,
}

impl Targets {
    pub fn new() -> Self {
        Targets { matrix: Mat::new() }
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.matrix
    }

    pub fn nfeatures(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn nsamples(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn validate(&self) -> Result<(), SimplexError> {
        super::validate_matrix("targets", self.matrix.as_ref())
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Mat<f64>> for Targets {
    fn from(matrix: Mat<f64>) -> Self {
        Targets { matrix }
    }
}

impl From<Array2<f64>> for Targets {
    fn from(array: Array2<f64>) -> Self {
        let matrix = array.view().into_faer().to_owned();
        Targets { matrix }
    }
}

impl From<&Array2<f64>> for Targets {
    fn from(array: &Array2<f64>) -> Self {
        let matrix = array.view().into_faer().to_owned();
        Targets { matrix }
    }
}

impl From<ArrayView2<'_, f64>> for Targets {
    fn from(array_view: ArrayView2<'_, f64>) -> Self {
        let matrix = array_view.into_faer().to_owned();
        Targets { matrix }
    }
}
