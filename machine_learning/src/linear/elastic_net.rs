use ndarray::{ArrayView1, ArrayView2};
use smartcore::linear::{
    elastic_net::{ElasticNet as SmartElasticNet, ElasticNetParameters},
    lasso::{Lasso as SmartLasso, LassoParameters},
};

use super::{
    Estimator, LinearModel,
    dense::{self, Prepared},
};
use crate::error::{MlErr, Result};

const DEFAULT_MAX_ITER: usize = 1000;
const DEFAULT_TOL: f64 = 1e-4;

/// Least squares with a mix of L1 and L2 penalties.
///
/// `alpha` scales the whole penalty and `l1_ratio` is the share given to the L1
/// term. Fitted with smartcore's interior point solver.
#[derive(Debug, Clone, Copy)]
pub struct ElasticNet {
    alpha: f64,
    l1_ratio: f64,
    max_iter: usize,
    tol: f64,
}

impl ElasticNet {
    /// Returns a new `ElasticNet`.
    ///
    /// # Arguments
    /// * `alpha` - The overall penalty strength.
    /// * `l1_ratio` - The share of the penalty that goes to the L1 term, in `[0, 1]`.
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

impl Default for ElasticNet {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

impl Estimator for ElasticNet {
    fn name(&self) -> &'static str {
        "elastic_net"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LinearModel> {
        check_solver(self.alpha, self.max_iter)?;
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(MlErr::InvalidParameter {
                name: "l1_ratio",
                reason: "must be in [0, 1]",
            });
        }

        let prepared = Prepared::new(x, y)?;

        let params = ElasticNetParameters::default()
            .with_alpha(self.alpha)
            .with_l1_ratio(self.l1_ratio)
            .with_normalize(false)
            .with_tol(self.tol)
            .with_max_iter(self.max_iter);
        let fitted: SmartElasticNet<f64, f64, _, Vec<f64>> =
            SmartElasticNet::fit(&prepared.x, &prepared.y, params)?;

        let w = dense::coefficients(fitted.coefficients())?;
        Ok(prepared.centered.into_model(w))
    }
}

/// Least squares with an L1 penalty of strength `alpha`.
#[derive(Debug, Clone, Copy)]
pub struct Lasso {
    alpha: f64,
    max_iter: usize,
    tol: f64,
}

impl Lasso {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl Default for Lasso {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Estimator for Lasso {
    fn name(&self) -> &'static str {
        "lasso"
    }

    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<LinearModel> {
        check_solver(self.alpha, self.max_iter)?;

        let prepared = Prepared::new(x, y)?;

        let params = LassoParameters::default()
            .with_alpha(self.alpha)
            .with_normalize(false)
            .with_tol(self.tol)
            .with_max_iter(self.max_iter);
        let fitted: SmartLasso<f64, f64, _, Vec<f64>> =
            SmartLasso::fit(&prepared.x, &prepared.y, params)?;

        let w = dense::coefficients(fitted.coefficients())?;
        Ok(prepared.centered.into_model(w))
    }
}

fn check_solver(alpha: f64, max_iter: usize) -> Result<()> {
    if !(alpha >= 0.0) {
        return Err(MlErr::InvalidParameter {
            name: "alpha",
            reason: "must be non negative",
        });
    }

    if max_iter == 0 {
        return Err(MlErr::InvalidParameter {
            name: "max_iter",
            reason: "must be positive",
        });
    }

    Ok(())
}
