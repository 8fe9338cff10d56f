use machine_learning::{FEATURE_NAMES, LinearModel, N_FEATURES};
use serde::{Deserialize, Serialize};

use crate::error::ServiceErr;

/// A trained model as it is persisted for a user.
///
/// Besides the fitted parameters, it records the feature names in the order the
/// coefficients apply to, so a model fitted on a different layout is never used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredModel {
    pub estimator: String,
    pub features: Vec<String>,
    pub model: LinearModel,
    pub train_samples: usize,
}

impl StoredModel {
    pub fn new(estimator: &str, model: LinearModel, train_samples: usize) -> Self {
        Self {
            estimator: estimator.to_string(),
            features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            model,
            train_samples,
        }
    }

    /// Makes sure the model applies to the features the predictor builds.
    ///
    /// # Errors
    /// Returns `ServiceErr::CorruptModel` if the feature names or the amount of
    /// coefficients don't match.
    pub fn check_layout(&self) -> Result<(), ServiceErr> {
        if self.features != FEATURE_NAMES {
            return Err(ServiceErr::CorruptModel(format!(
                "expected features {FEATURE_NAMES:?}, found {:?}",
                self.features
            )));
        }

        if self.model.n_features() != N_FEATURES {
            return Err(ServiceErr::CorruptModel(format!(
                "expected {N_FEATURES} coefficients, found {}",
                self.model.n_features()
            )));
        }

        Ok(())
    }
}
