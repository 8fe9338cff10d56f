use crate::{error::Result, key::Key};

/// A key-value store of opaque byte blobs.
///
/// Implementations must make `put` atomic with respect to `get`: a reader sees either
/// the previous blob or the new one, never a mix or a prefix of them.
pub trait BlobStore: Send + Sync {
    /// Stores `blob` under `key`, replacing any previous blob.
    ///
    /// # Errors
    /// Returns `StoreErr::Io` if the blob couldn't be persisted.
    fn put(&self, key: &Key, blob: &[u8]) -> Result<()>;

    /// Returns the blob stored under `key`.
    ///
    /// # Errors
    /// Returns `StoreErr::NotFound` if there is none.
    fn get(&self, key: &Key) -> Result<Vec<u8>>;
}

impl<B: BlobStore + ?Sized> BlobStore for std::sync::Arc<B> {
    fn put(&self, key: &Key, blob: &[u8]) -> Result<()> {
        (**self).put(key, blob)
    }

    fn get(&self, key: &Key) -> Result<Vec<u8>> {
        (**self).get(key)
    }
}
