use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The model store's result type.
pub type Result<T> = std::result::Result<T, StoreErr>;

/// Failures while validating keys or moving models in and out of the store.
#[derive(Debug)]
pub enum StoreErr {
    /// The key can't be used to address an entry.
    InvalidKey { key: String, reason: &'static str },
    /// There is no entry for the key.
    NotFound(String),
    Io(io::Error),
    /// The entry exists but couldn't be encoded or decoded.
    Serialization(serde_json::Error),
}

impl Display for StoreErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErr::InvalidKey { key, reason } => write!(f, "invalid key {key:?}: {reason}"),
            StoreErr::NotFound(key) => write!(f, "no entry stored for {key:?}"),
            StoreErr::Io(e) => write!(f, "io error: {e}"),
            StoreErr::Serialization(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl Error for StoreErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreErr::Io(e) => Some(e),
            StoreErr::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
