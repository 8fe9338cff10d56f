use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{Centered, Estimator, LinearModel};
use crate::{
    error::{MlErr, Result},
    linalg,
};

/// Bayesian ridge regression.
///
/// Puts a Gaussian prior of precision `lambda` on the coefficients and a Gaussian
/// noise of precision `alpha` on the targets. Both precisions, in turn, have Gamma
/// priors and are estimated by maximizing the evidence.
#[derive(Debug, Clone, Copy)]
pub struct BayesianRidge {
    n_iter: usize,
    tol: f64,
    alpha_1: f64,
    alpha_2: f64,
    lambda_1: f64,
    lambda_2: f64,
}

impl BayesianRidge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Solves for the posterior mean of the coefficients given both precisions.
    fn posterior_mean(
        gram: &Array2<f64>,
        moment: &Array1<f64>,
        alpha: f64,
        lambda: f64,
    ) -> Result<(Array1<f64>, Array2<f64>)> {
        let precision = gram * alpha + Array2::<f64>::eye(gram.nrows()) * lambda;
        let covariance = linalg::invert(precision.view())?;
        let w = covariance.dot(moment) * alpha;
        Ok((w, covariance))
    }
}

impl Default for BayesianRidge {
    fn default() -> Self {
        Self {
            n_iter: 300,
            tol: 1e-3,
            alpha_1: 1e-6,
            alpha_2: 1e-6,
            lambda_1: 1e-6,
            lambda_2: 1e-6,
        }
    }
}

impl Estimator for BayesianRidge {
    fn name(&self) -> &'static str {
        "bayesian_ridge"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LinearModel> {
        if self.n_iter == 0 {
            return Err(MlErr::InvalidParameter {
                name: "n_iter",
                reason: "must be positive",
            });
        }

        let centered = Centered::new(x, y)?;
        let (n, p) = (centered.samples() as f64, centered.features() as f64);

        let gram = centered.x.t().dot(&centered.x);
        let moment = centered.x.t().dot(&centered.y);

        let var = centered.y.dot(&centered.y) / n;
        let mut alpha = 1.0 / (var + f64::EPSILON);
        let mut lambda = 1.0;
        let mut prev: Option<Array1<f64>> = None;

        for iter in 0..self.n_iter {
            let (w, covariance) = Self::posterior_mean(&gram, &moment, alpha, lambda)?;

            // Effective number of parameters: sum of alpha e / (lambda + alpha e) over the
            // eigenvalues e of the gram matrix, which equals p - lambda tr(covariance).
            let gamma = p - lambda * covariance.diag().sum();

            let residual = &centered.y - &centered.x.dot(&w);
            let sse = residual.dot(&residual);

            lambda = (gamma + 2.0 * self.lambda_1) / (w.dot(&w) + 2.0 * self.lambda_2);
            alpha = (n - gamma + 2.0 * self.alpha_1) / (sse + 2.0 * self.alpha_2);

            if let Some(prev) = &prev {
                let delta: f64 = (prev - &w).iter().map(|d| d.abs()).sum();
                if delta < self.tol {
                    debug!("bayesian ridge converged after {} iterations", iter + 1);
                    break;
                }
            }
            prev = Some(w);
        }

        let (w, _) = Self::posterior_mean(&gram, &moment, alpha, lambda)?;
        Ok(centered.into_model(w))
    }
}
