use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use machine_learning::MlErr;
use model_store::StoreErr;
use serde_json::json;

/// Failures of a single train or predict request.
#[derive(Debug)]
pub enum ServiceErr {
    /// The request is missing a field or carries an invalid value.
    ClientInput(String),
    /// There is nothing to act on for the requested user.
    NotFound(String),
    /// The model store couldn't be read from or written to.
    Persistence(StoreErr),
    /// A stored model doesn't describe the features the predictor builds.
    CorruptModel(String),
    /// The training data is degenerate.
    Training(MlErr),
    /// A blocking task panicked or was cancelled.
    Internal(String),
}

impl ServiceErr {
    /// Returns the HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceErr::ClientInput(_) => StatusCode::BAD_REQUEST,
            ServiceErr::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceErr::Persistence(_)
            | ServiceErr::CorruptModel(_)
            | ServiceErr::Training(_)
            | ServiceErr::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ServiceErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErr::ClientInput(msg) => write!(f, "bad request: {msg}"),
            ServiceErr::NotFound(msg) => write!(f, "not found: {msg}"),
            ServiceErr::Persistence(e) => write!(f, "model store failure: {e}"),
            ServiceErr::CorruptModel(msg) => write!(f, "stored model is corrupt: {msg}"),
            ServiceErr::Training(e) => write!(f, "training failed: {e}"),
            ServiceErr::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl Error for ServiceErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServiceErr::Persistence(e) => Some(e),
            ServiceErr::Training(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreErr> for ServiceErr {
    fn from(value: StoreErr) -> Self {
        match value {
            StoreErr::NotFound(key) => Self::NotFound(format!("no model trained for user {key}")),
            StoreErr::InvalidKey { key, reason } => {
                Self::ClientInput(format!("invalid `userid` {key:?}: {reason}"))
            }
            other => Self::Persistence(other),
        }
    }
}

impl From<MlErr> for ServiceErr {
    fn from(value: MlErr) -> Self {
        Self::Training(value)
    }
}

impl IntoResponse for ServiceErr {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failures that keep the server from starting.
#[derive(Debug)]
pub enum StartupErr {
    /// An environment variable holds an unparsable value.
    Config {
        var: &'static str,
        value: String,
        reason: String,
    },
    /// The dataset is unreadable or malformed.
    Dataset { path: PathBuf, source: MlErr },
    Bind { addr: String, source: io::Error },
    /// The binary was asked for a mode it doesn't have.
    UnknownMode(String),
    /// The algorithm comparison couldn't be run on the dataset.
    Comparison(MlErr),
    Io(io::Error),
}

impl Display for StartupErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupErr::Config { var, value, reason } => {
                write!(f, "invalid value {value:?} for {var}: {reason}")
            }
            StartupErr::Dataset { path, source } => {
                write!(f, "failed to load dataset {}: {source}", path.display())
            }
            StartupErr::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            StartupErr::UnknownMode(mode) => write!(
                f,
                "unknown mode {mode:?}, expected one of serve, describe or compare"
            ),
            StartupErr::Comparison(e) => write!(f, "failed to compare the algorithms: {e}"),
            StartupErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for StartupErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StartupErr::Dataset { source, .. } => Some(source),
            StartupErr::Bind { source, .. } => Some(source),
            StartupErr::Comparison(e) => Some(e),
            StartupErr::Io(e) => Some(e),
            StartupErr::Config { .. } | StartupErr::UnknownMode(_) => None,
        }
    }
}

impl From<io::Error> for StartupErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for the binary.
impl From<StartupErr> for io::Error {
    fn from(value: StartupErr) -> Self {
        match value {
            StartupErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}
