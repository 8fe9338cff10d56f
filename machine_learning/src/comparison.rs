//! Spot checks a handful of linear algorithms with k-fold cross validation.

use std::fmt;

use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::{
    error::Result,
    linear::{BayesianRidge, ElasticNet, Estimator, Lasso, LinearRegression, Ridge},
    metrics::r2_score,
    split::k_fold,
};

/// The default amount of cross validation folds.
pub const DEFAULT_FOLDS: usize = 3;

/// An estimator entered into the comparison under a short label.
pub struct Candidate {
    pub label: &'static str,
    pub estimator: Box<dyn Estimator>,
}

impl Candidate {
    pub fn new<E: Estimator + 'static>(label: &'static str, estimator: E) -> Self {
        Self {
            label,
            estimator: Box::new(estimator),
        }
    }
}

/// The ordinary least squares, ridge, lasso, elastic net and bayesian ridge
/// variants, each with its default parameters.
pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("LR", LinearRegression::new()),
        Candidate::new("RID", Ridge::default()),
        Candidate::new("LAS", Lasso::default()),
        Candidate::new("EN", ElasticNet::default()),
        Candidate::new("BR", BayesianRidge::default()),
    ]
}

/// The cross validation scores of a single candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub label: &'static str,
    pub scores: Vec<f64>,
}

impl CrossValidation {
    pub fn mean(&self) -> f64 {
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Population standard deviation of the scores.
    pub fn std(&self) -> f64 {
        let mean = self.mean();
        let var = self.scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
            / self.scores.len() as f64;
        var.sqrt()
    }
}

impl fmt::Display for CrossValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.6} ({:.6})", self.label, self.mean(), self.std())
    }
}

/// Scores an estimator with the R² of each of `folds` contiguous folds.
///
/// # Errors
/// Fails if the samples can't be split or any fit fails.
pub fn cross_val_score(
    estimator: &dyn Estimator,
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    folds: usize,
) -> Result<Vec<f64>> {
    k_fold(y.len(), folds)?
        .into_iter()
        .map(|split| {
            let model = estimator.fit(
                x.select(Axis(0), &split.train).view(),
                y.select(Axis(0), &split.train).view(),
            )?;

            let x_test = x.select(Axis(0), &split.validation);
            let y_test = y.select(Axis(0), &split.validation);
            let y_pred = model.predict(x_test.view())?;
            r2_score(y_test.view(), y_pred.view())
        })
        .collect()
}

/// Cross validates every candidate in parallel.
///
/// # Returns
/// One `CrossValidation` per candidate, in the same order.
pub fn compare(
    candidates: &[Candidate],
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    folds: usize,
) -> Result<Vec<CrossValidation>> {
    candidates
        .par_iter()
        .map(|candidate| {
            let scores = cross_val_score(candidate.estimator.as_ref(), x, y, folds)?;
            Ok(CrossValidation {
                label: candidate.label,
                scores,
            })
        })
        .collect()
}
