use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{
    blob::BlobStore,
    error::{Result, StoreErr},
    key::Key,
};

/// A `BlobStore` that keeps every blob in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<Key, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the amount of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &Key, blob: &[u8]) -> Result<()> {
        self.blobs.write().insert(key.clone(), blob.to_vec());
        Ok(())
    }

    fn get(&self, key: &Key) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreErr::NotFound(key.to_string()))
    }
}
