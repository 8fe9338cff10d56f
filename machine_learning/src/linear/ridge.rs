use ndarray::{ArrayView1, ArrayView2};
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};

use super::{
    Estimator, LinearModel,
    dense::{self, Prepared},
};
use crate::error::{MlErr, Result};

/// Least squares with an L2 penalty of strength `alpha` on the coefficients.
///
/// The intercept is left out of the penalty.
#[derive(Debug, Clone, Copy)]
pub struct Ridge {
    alpha: f64,
}

impl Ridge {
    /// Returns a new `Ridge`.
    ///
    /// # Arguments
    /// * `alpha` - The regularization strength, must be non negative.
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Default for Ridge {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Estimator for Ridge {
    fn name(&self) -> &'static str {
        "ridge"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LinearModel> {
        if !(self.alpha >= 0.0) {
            return Err(MlErr::InvalidParameter {
                name: "alpha",
                reason: "must be non negative",
            });
        }

        let prepared = Prepared::new(x, y)?;

        // Samples are already centered, smartcore must not rescale them again.
        let params = RidgeRegressionParameters::default()
            .with_alpha(self.alpha)
            .with_normalize(false);
        let fitted: RidgeRegression<f64, f64, _, Vec<f64>> =
            RidgeRegression::fit(&prepared.x, &prepared.y, params)?;

        let w = dense::coefficients(fitted.coefficients())?;
        Ok(prepared.centered.into_model(w))
    }
}
