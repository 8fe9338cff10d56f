use std::sync::Arc;

use log::info;
use model_store::Key;

use crate::{error::ServiceErr, request::Observation, trainer::Store};

/// Serves predictions out of the persisted models.
pub struct Predictor {
    store: Arc<Store>,
}

impl Predictor {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Predicts the insulin value of `observation` with the model of `user`.
    ///
    /// Reads the model file and takes no lock, so it may observe the model of a
    /// train that finished while this call was running.
    ///
    /// # Errors
    /// - `ServiceErr::NotFound` if `user` has no trained model.
    /// - `ServiceErr::Persistence` if the model file can't be read or decoded.
    /// - `ServiceErr::CorruptModel` if the model was fitted on other features.
    /// - `ServiceErr::ClientInput` if the observation drives the model out of range.
    pub fn predict(&self, user: &Key, observation: &Observation) -> Result<f64, ServiceErr> {
        let stored = self.store.load(user)?;
        stored.check_layout()?;

        let prediction = stored.model.predict_one(&observation.features())?;
        if !prediction.is_finite() {
            return Err(ServiceErr::ClientInput(format!(
                "the observation yields a non finite prediction ({prediction})"
            )));
        }

        info!(user = user.as_str(), prediction = prediction; "prediction served");
        Ok(prediction)
    }
}
