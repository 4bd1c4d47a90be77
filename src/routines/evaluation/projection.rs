use faer::Mat;

use crate::error::{Degeneracy, SimplexError};
use crate::routines::settings::DegeneratePolicy;

/// Clamp every entry to `[0, 1]` and rescale each column to sum to one
///
/// Returns the indices of the columns that were replaced by the uniform distribution,
/// which only happens under [DegeneratePolicy::Uniform].
pub fn project_columns(
    x: &mut Mat<f64>,
    policy: DegeneratePolicy,
) -> Result<Vec<usize>, SimplexError> {
    let k = x.nrows();
    let mut uniform = Vec::new();

    for j in 0..x.ncols() {
        let mut sum = 0.0;
        for i in 0..k {
            let v = x[(i, j)].clamp(0.0, 1.0);
            x[(i, j)] = v;
            sum += v;
        }

        if sum > 0.0 {
            for i in 0..k {
                x[(i, j)] /= sum;
            }
            continue;
        }

        match policy {
            DegeneratePolicy::Strict => {
                return Err(SimplexError::DegenerateInput {
                    column: j,
                    reason: Degeneracy::ZeroMass,
                })
            }
            DegeneratePolicy::Uniform => {
                for i in 0..k {
                    x[(i, j)] = 1.0 / k as f64;
                }
                uniform.push(j);
            }
        }
    }

    Ok(uniform)
}
