use std::sync::Arc;

use log::{debug, info, warn};
use machine_learning::{
    Dataset, Estimator, LinearModel, LinearRegression,
    comparison::{self, DEFAULT_FOLDS},
    metrics::{mean_absolute_error, mean_squared_error, r2_score},
    split::train_test_split,
};
use model_store::{BlobStore, Key, KeyedLocks, ModelStore};
use ndarray::{ArrayView1, ArrayView2};
use serde::Serialize;

use crate::{error::ServiceErr, model::StoredModel};

/// The model store shared by the trainer and the predictor.
pub type Store = ModelStore<StoredModel, Arc<dyn BlobStore>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// Share of the rows withheld for validation.
    pub test_fraction: f64,
    /// Seed of the train/validation split, fixed across calls.
    pub seed: u64,
    /// Whether every train also cross validates the alternative estimators.
    pub compare_on_train: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 7,
            compare_on_train: false,
        }
    }
}

/// The acknowledgment of a successful train.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    pub status: &'static str,
    pub userid: String,
    pub train_samples: usize,
    pub validation_samples: usize,
}

/// Fits and persists per-user models.
pub struct Trainer {
    dataset: Arc<Dataset>,
    store: Arc<Store>,
    locks: KeyedLocks,
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(dataset: Arc<Dataset>, store: Arc<Store>, config: TrainerConfig) -> Self {
        Self {
            dataset,
            store,
            locks: KeyedLocks::new(),
            config,
        }
    }

    /// Trains an ordinary least squares model for `user` and persists it, replacing
    /// any previous one.
    ///
    /// Trains of the same user run one at a time, so the last one to finish wins.
    /// This call blocks, async callers should run it on the blocking pool.
    ///
    /// # Errors
    /// - `ServiceErr::NotFound` if the dataset is partitioned and `user` has no rows.
    /// - `ServiceErr::Training` if the rows can't be split or the fit is degenerate.
    /// - `ServiceErr::Persistence` if the model can't be stored.
    pub fn train(&self, user: &Key) -> Result<TrainReport, ServiceErr> {
        self.locks.with(user, || self.train_locked(user))
    }

    fn train_locked(&self, user: &Key) -> Result<TrainReport, ServiceErr> {
        let data = self
            .dataset
            .for_user(user.as_str())
            .ok_or_else(|| ServiceErr::NotFound(format!("no observations for user {user}")))?;

        let split = train_test_split(data.len(), self.config.test_fraction, self.config.seed)?;
        let (x_train, y_train) = data.select(&split.train);
        let (x_val, y_val) = data.select(&split.validation);

        let estimator = LinearRegression::new();
        let model = estimator.fit(x_train.view(), y_train.view())?;
        validate(user, &model, x_val.view(), y_val.view())?;

        if self.config.compare_on_train {
            compare(user, x_train.view(), y_train.view());
        }

        let stored = StoredModel::new(estimator.name(), model, split.train.len());
        self.store.save(user, &stored)?;

        info!(
            user = user.as_str(),
            train_samples = split.train.len(),
            validation_samples = split.validation.len();
            "model trained"
        );

        Ok(TrainReport {
            status: "Success",
            userid: user.to_string(),
            train_samples: split.train.len(),
            validation_samples: split.validation.len(),
        })
    }
}

/// Scores a freshly fitted model on the withheld rows. Only logged.
fn validate(
    user: &Key,
    model: &LinearModel,
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
) -> Result<(), ServiceErr> {
    let y_pred = model.predict(x)?;

    for (predicted, actual) in y_pred.iter().zip(y) {
        debug!(user = user.as_str(), predicted = *predicted, actual = *actual; "validation prediction");
    }

    let r2 = r2_score(y, y_pred.view())?;
    let mse = mean_squared_error(y, y_pred.view())?;
    let mae = mean_absolute_error(y, y_pred.view())?;
    info!(user = user.as_str(), r2 = r2, mse = mse, mae = mae; "validation metrics");

    Ok(())
}

fn compare(user: &Key, x: ArrayView2<f64>, y: ArrayView1<f64>) {
    let candidates = comparison::default_candidates();
    match comparison::compare(&candidates, x, y, DEFAULT_FOLDS) {
        Ok(results) => {
            for result in results {
                info!(user = user.as_str(); "{result}");
            }
        }
        Err(e) => warn!(user = user.as_str(); "skipping the algorithm comparison: {e}"),
    }
}
