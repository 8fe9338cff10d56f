//! Conversions between ndarray views and smartcore's dense matrices.

use ndarray::{Array1, ArrayView1, ArrayView2};
use smartcore::linalg::basic::{arrays::Array, matrix::DenseMatrix};

use super::Centered;
use crate::error::{MlErr, Result};

/// Centered samples in the layout smartcore's estimators take.
pub(crate) struct Prepared {
    pub centered: Centered,
    pub x: DenseMatrix<f64>,
    pub y: Vec<f64>,
}

impl Prepared {
    /// # Errors
    /// Fails on mismatching shapes and when there aren't more samples than features.
    pub fn new(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self> {
        let centered = Centered::new(x, y)?;
        if centered.samples() <= centered.features() {
            return Err(MlErr::NotEnoughSamples {
                got: centered.samples(),
                expected: centered.features() + 1,
            });
        }

        let rows: Vec<Vec<f64>> = centered.x.outer_iter().map(|row| row.to_vec()).collect();
        let x = DenseMatrix::from_2d_vec(&rows)?;
        let y = centered.y.to_vec();

        Ok(Self { centered, x, y })
    }
}

/// Reads a `(features, 1)` or `(1, features)` coefficient matrix.
///
/// # Errors
/// Returns `MlErr::SingularMatrix` if any coefficient is not finite.
pub(crate) fn coefficients(m: &DenseMatrix<f64>) -> Result<Array1<f64>> {
    let (rows, cols) = <DenseMatrix<f64> as Array<f64, (usize, usize)>>::shape(m);

    let w: Array1<f64> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .map(|pos| *<DenseMatrix<f64> as Array<f64, (usize, usize)>>::get(m, pos))
        .collect();

    if w.iter().any(|v| !v.is_finite()) {
        return Err(MlErr::SingularMatrix);
    }

    Ok(w)
}
