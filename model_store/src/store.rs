use std::marker::PhantomData;

use log::debug;
use serde::{Serialize, de::DeserializeOwned};

use crate::{blob::BlobStore, error::Result, fs::FsBlobStore, key::Key};

/// A typed view over a `BlobStore` that keeps at most one model per key.
///
/// Models are encoded as JSON. Floating point values survive a `save` followed by a
/// `load` bit for bit.
#[derive(Debug)]
pub struct ModelStore<T, B = FsBlobStore> {
    backend: B,
    _model: PhantomData<fn() -> T>,
}

impl<T, B: BlobStore> ModelStore<T, B> {
    /// Creates a new `ModelStore` on top of the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            _model: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<T: Serialize + DeserializeOwned, B: BlobStore> ModelStore<T, B> {
    /// Persists `model` under `key`, replacing any previous model.
    ///
    /// # Errors
    /// Returns `StoreErr::Serialization` if the model can't be encoded and
    /// `StoreErr::Io` if it can't be written.
    pub fn save(&self, key: &Key, model: &T) -> Result<()> {
        let blob = serde_json::to_vec_pretty(model)?;
        self.backend.put(key, &blob)?;
        debug!(key = key.as_str(); "model saved");
        Ok(())
    }

    /// Loads the model stored under `key`.
    ///
    /// # Errors
    /// Returns `StoreErr::NotFound` if there is no model, `StoreErr::Serialization`
    /// if the stored bytes aren't a valid model and `StoreErr::Io` on read failures.
    pub fn load(&self, key: &Key) -> Result<T> {
        let blob = self.backend.get(key)?;
        Ok(serde_json::from_slice(&blob)?)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::{error::StoreErr, memory::MemoryBlobStore};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        coefficients: Vec<f64>,
        intercept: f64,
    }

    fn store() -> ModelStore<Params, MemoryBlobStore> {
        ModelStore::new(MemoryBlobStore::new())
    }

    #[test]
    fn test_round_trip_is_exact() {
        let store = store();
        let key = Key::parse("u1").unwrap();
        let params = Params {
            coefficients: vec![0.1 + 0.2, -1.0 / 3.0, 1e-300, f64::MAX],
            intercept: std::f64::consts::PI,
        };

        store.save(&key, &params).unwrap();
        let loaded = store.load(&key).unwrap();

        for (a, b) in loaded.coefficients.iter().zip(&params.coefficients) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(loaded.intercept.to_bits(), params.intercept.to_bits());
    }

    #[test]
    fn test_load_before_save_is_not_found() {
        let key = Key::parse("u2").unwrap();
        assert!(matches!(store().load(&key), Err(StoreErr::NotFound(_))));
    }

    #[test]
    fn test_corrupt_entry_is_a_serialization_error() {
        let store = store();
        let key = Key::parse("u3").unwrap();
        store.backend().put(&key, b"{\"coefficients\": [1.0,").unwrap();

        assert!(matches!(store.load(&key), Err(StoreErr::Serialization(_))));
    }
}
