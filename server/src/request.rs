//! Bodies of the train and predict requests.

use model_store::Key;
use serde::{Deserialize, Deserializer, de};

/// A user id as it may arrive on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Str(String),
    Int(i64),
}

impl RawUserId {
    fn into_key(self) -> Result<Key, model_store::StoreErr> {
        match self {
            RawUserId::Str(s) => Key::parse(&s),
            RawUserId::Int(n) => Key::parse(&n.to_string()),
        }
    }
}

/// Accepts the user id either as a string or as an integer, both naming the same model.
fn user_key<'de, D>(deserializer: D) -> Result<Key, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawUserId::deserialize(deserializer)
        .map_err(|_| de::Error::custom("`userid` must be a string or an integer"))?;
    raw.into_key().map_err(de::Error::custom)
}

/// A request to (re)train a user's model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainRequest {
    #[serde(rename = "userid", deserialize_with = "user_key")]
    pub user: Key,
}

/// One observation sent for prediction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Observation {
    pub pf_time_of_day: f64,
    pub bg_value: f64,
    pub food_value: f64,
    pub exercise_value: f64,
    /// Required on the wire but never fed to the model, since it is what the model
    /// predicts.
    pub ins_value: f64,
}

impl Observation {
    /// Returns the feature vector in `FEATURE_NAMES` order.
    pub fn features(&self) -> [f64; 4] {
        [
            self.pf_time_of_day,
            self.bg_value,
            self.food_value,
            self.exercise_value,
        ]
    }
}

/// A request to predict a user's insulin dose.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "userid", deserialize_with = "user_key")]
    pub user: Key,
    #[serde(flatten)]
    pub observation: Observation,
}
