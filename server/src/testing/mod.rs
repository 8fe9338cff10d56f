use std::sync::Arc;

use machine_learning::Dataset;
use model_store::{BlobStore, MemoryBlobStore, ModelStore};

use crate::trainer::Store;

mod sample;

pub use sample::{partitioned_csv, sample_csv};

pub fn sample_dataset() -> Dataset {
    Dataset::from_reader(sample_csv(60).as_bytes()).unwrap()
}

pub fn memory_store() -> (Arc<MemoryBlobStore>, Arc<Store>) {
    let blobs = Arc::new(MemoryBlobStore::new());
    let backend: Arc<dyn BlobStore> = blobs.clone();
    (blobs, Arc::new(ModelStore::new(backend)))
}
