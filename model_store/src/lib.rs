//! Persistence of one serialized model per key.
//!
//! `ModelStore` turns models into bytes and back, while a `BlobStore` decides where
//! those bytes live. Keys are validated up front so they can be embedded in file
//! names safely.

mod blob;
pub mod error;
mod fs;
mod key;
mod locks;
mod memory;
mod store;

pub use blob::BlobStore;
pub use error::{Result, StoreErr};
pub use fs::{FsBlobStore, StagedBlob};
pub use key::Key;
pub use locks::KeyedLocks;
pub use memory::MemoryBlobStore;
pub use store::ModelStore;
