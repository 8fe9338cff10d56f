pub mod comparison;
pub mod dataset;
pub mod error;
mod linalg;
pub mod linear;
pub mod metrics;
pub mod split;
pub mod stats;

pub use dataset::{COLUMN_NAMES, Dataset, FEATURE_NAMES, N_FEATURES, TARGET_NAME, USER_COLUMN};
pub use error::{MlErr, Result};
pub use linear::{Estimator, LinearModel, LinearRegression};
