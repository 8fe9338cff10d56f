use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::key::Key;

/// Mutual exclusion per key.
///
/// Callers holding different keys never wait on each other. A key's lock is dropped
/// from the map as soon as nobody holds or waits for it.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock of `key`.
    ///
    /// # Returns
    /// Whatever `f` returns.
    pub fn with<R>(&self, key: &Key, f: impl FnOnce() -> R) -> R {
        let lock = Arc::clone(self.locks.lock().entry(key.clone()).or_default());

        let ret = {
            let _guard = lock.lock();
            f()
        };

        let mut locks = self.locks.lock();
        // Only the map and this call still reference the lock.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }

        ret
    }

    /// Returns the amount of keys currently locked or waited for.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
