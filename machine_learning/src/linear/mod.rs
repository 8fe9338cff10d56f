mod bayesian_ridge;
mod dense;
mod elastic_net;
mod ols;
mod ridge;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{MlErr, Result};

pub use bayesian_ridge::BayesianRidge;
pub use elastic_net::{ElasticNet, Lasso};
pub use ols::LinearRegression;
pub use ridge::Ridge;

/// A learning algorithm that fits a linear model with an intercept.
pub trait Estimator: Send + Sync {
    /// Returns a short, stable name for the algorithm.
    fn name(&self) -> &'static str;

    /// Fits a model on the given samples.
    ///
    /// # Arguments
    /// * `x` - A `(samples, features)` matrix.
    /// * `y` - One target per sample.
    ///
    /// # Errors
    /// Fails on shape mismatches, empty inputs or degenerate data.
    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LinearModel>;
}

/// The fitted parameters of a linear model: `y = x · coefficients + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Returns the amount of features the model expects.
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predicts the target of a single sample.
    ///
    /// # Errors
    /// Fails if `x` doesn't have `n_features` values.
    pub fn predict_one(&self, x: &[f64]) -> Result<f64> {
        self.check_features(x.len())?;

        let dot: f64 = x.iter().zip(&self.coefficients).map(|(x, w)| x * w).sum();
        Ok(dot + self.intercept)
    }

    /// Predicts the targets of every row of `x`.
    ///
    /// # Errors
    /// Fails if `x` doesn't have `n_features` columns.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.check_features(x.ncols())?;

        let w = ArrayView1::from(&self.coefficients[..]);
        Ok(x.dot(&w) + self.intercept)
    }

    fn check_features(&self, got: usize) -> Result<()> {
        if got != self.n_features() {
            return Err(MlErr::SizeMismatch {
                a: "sample",
                b: "coefficients",
                got,
                expected: self.n_features(),
            });
        }

        Ok(())
    }
}

/// Samples shifted so every column, and the target, have zero mean.
///
/// Fitting on centered data and recovering the intercept afterwards is how every
/// estimator in this module handles the intercept.
pub(crate) struct Centered {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    x_mean: Array1<f64>,
    y_mean: f64,
}

impl Centered {
    pub fn new(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                a: "samples",
                b: "targets",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        let (Some(x_mean), Some(y_mean)) = (x.mean_axis(Axis(0)), y.mean()) else {
            return Err(MlErr::NotEnoughSamples { got: 0, expected: 1 });
        };

        Ok(Self {
            x: &x - &x_mean,
            y: &y - y_mean,
            x_mean,
            y_mean,
        })
    }

    pub fn samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn features(&self) -> usize {
        self.x.ncols()
    }

    /// Builds the model out of coefficients fitted on the centered data.
    pub fn into_model(self, w: Array1<f64>) -> LinearModel {
        let intercept = self.y_mean - self.x_mean.dot(&w);
        LinearModel::new(w.to_vec(), intercept)
    }
}
