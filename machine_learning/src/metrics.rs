//! Regression scores over paired targets and predictions.

use ndarray::ArrayView1;

use crate::error::{MlErr, Result};

/// Mean squared error.
pub fn mean_squared_error(y: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check_pair(y, y_pred)?;
    Ok((&y - &y_pred).mapv(|e| e.powi(2)).mean().unwrap_or_default())
}

/// Mean absolute error.
pub fn mean_absolute_error(y: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check_pair(y, y_pred)?;
    Ok((&y - &y_pred).mapv(f64::abs).mean().unwrap_or_default())
}

/// Coefficient of determination.
///
/// For a constant `y` the score is `1.0` if every prediction is exact and `0.0`
/// otherwise, so it's always finite.
pub fn r2_score(y: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check_pair(y, y_pred)?;

    let mean = y.mean().unwrap_or_default();
    let ss_res: f64 = y.iter().zip(&y_pred).map(|(a, b)| (a - b).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

fn check_pair(y: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<()> {
    if y.len() != y_pred.len() {
        return Err(MlErr::SizeMismatch {
            a: "predictions",
            b: "targets",
            got: y_pred.len(),
            expected: y.len(),
        });
    }

    if y.is_empty() {
        return Err(MlErr::NotEnoughSamples { got: 0, expected: 1 });
    }

    Ok(())
}
