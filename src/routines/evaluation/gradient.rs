//! Gradient and objective of `½||AX - B||²`
//!
//! `AᵀA` and `AᵀB` are formed once per solve; every outer iteration then only
//! needs one `k x k` by `k x n` product for the gradient and one product with `A`
//! for the fitted values.

use faer::{Mat, MatRef};

/// Precomputed quadratic form of the least-squares objective
#[derive(Debug, Clone)]
pub struct QuadraticForm {
    ata: Mat<f64>,
    atb: Mat<f64>,
}

impl QuadraticForm {
    pub fn new(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> Self {
        let ata = a.transpose() * a;
        let atb = a.transpose() * b;
        QuadraticForm { ata, atb }
    }

    /// `AᵀA`, `k x k`
    pub fn ata(&self) -> &Mat<f64> {
        &self.ata
    }

    /// `AᵀB`, `k x n`
    pub fn atb(&self) -> &Mat<f64> {
        &self.atb
    }

    /// `(AᵀA)X - AᵀB`
    pub fn gradient(&self, x: MatRef<'_, f64>) -> Mat<f64> {
        let ata_x = self.ata.as_ref() * x;
        &ata_x - &self.atb
    }
}

/// Gradient and residual of one iterate, shared by all column updates of an iteration
#[derive(Debug, Clone)]
pub struct Evaluation {
    gradient: Mat<f64>,
    fitted: Mat<f64>,
    residual: Mat<f64>,
}

impl Evaluation {
    pub fn new(
        form: &QuadraticForm,
        a: MatRef<'_, f64>,
        b: MatRef<'_, f64>,
        x: MatRef<'_, f64>,
    ) -> Self {
        let gradient = form.gradient(x);
        let fitted = a * x;
        let residual = Mat::from_fn(fitted.nrows(), fitted.ncols(), |i, j| {
            fitted[(i, j)] - b[(i, j)]
        });

        Evaluation {
            gradient,
            fitted,
            residual,
        }
    }

    pub fn gradient(&self) -> &Mat<f64> {
        &self.gradient
    }

    /// `AX - B`
    pub fn residual(&self) -> &Mat<f64> {
        &self.residual
    }

    pub fn gradient_column(&self, j: usize) -> Vec<f64> {
        self.gradient.col(j).iter().copied().collect()
    }

    /// Column `j` of `AX`
    pub fn fitted_column(&self, j: usize) -> Vec<f64> {
        self.fitted.col(j).iter().copied().collect()
    }

    pub fn residual_column(&self, j: usize) -> Vec<f64> {
        self.residual.col(j).iter().copied().collect()
    }

    /// Reconstruction error `||AX - B||_F`
    pub fn objective(&self) -> f64 {
        self.residual.norm_l2()
    }
}

/// Reconstruction error `||AX - B||_F` for an arbitrary `X`
pub fn reconstruction_error(a: MatRef<'_, f64>, b: MatRef<'_, f64>, x: MatRef<'_, f64>) -> f64 {
    let fitted = a * x;
    let mut total = 0.0;
    for j in 0..fitted.ncols() {
        for i in 0..fitted.nrows() {
            let r = fitted[(i, j)] - b[(i, j)];
            total += r * r;
        }
    }
    total.sqrt()
}
