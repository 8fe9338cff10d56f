use ndarray::{ArrayView1, ArrayView2};
use smartcore::linear::linear_regression::{
    LinearRegression as QrRegression, LinearRegressionParameters, LinearRegressionSolverName,
};

use super::{
    Estimator, LinearModel,
    dense::{self, Prepared},
};
use crate::error::Result;

/// Ordinary least squares.
///
/// Solved through a QR decomposition of the centered samples, which reports rank
/// deficient data instead of picking one of infinitely many solutions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearRegression;

impl LinearRegression {
    /// Returns a new `LinearRegression`.
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for LinearRegression {
    fn name(&self) -> &'static str {
        "ordinary_least_squares"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LinearModel> {
        let prepared = Prepared::new(x, y)?;

        let params =
            LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::QR);
        let fitted: QrRegression<f64, f64, _, Vec<f64>> =
            QrRegression::fit(&prepared.x, &prepared.y, params)?;

        let w = dense::coefficients(fitted.coefficients())?;
        Ok(prepared.centered.into_model(w))
    }
}
