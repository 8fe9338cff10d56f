use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    blob::BlobStore,
    error::{Result, StoreErr},
    key::Key,
};

/// File name prefix of every entry.
pub const DEFAULT_PREFIX: &str = "model_user_";

/// File extension of every entry, dot included.
pub const DEFAULT_EXTENSION: &str = ".pkl";

/// A `BlobStore` holding one file per key inside a directory.
///
/// The file of a key is `<dir>/<prefix><key><extension>`. Blobs are written to a
/// temporary sibling first and then renamed over the entry, so readers never see a
/// partially written file.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl FsBlobStore {
    /// Creates a new `FsBlobStore` using the default file name template.
    ///
    /// The directory is created lazily, on the first `put`.
    ///
    /// # Arguments
    /// * `dir` - The directory the entries live in.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self::with_template(dir, DEFAULT_PREFIX, DEFAULT_EXTENSION)
    }

    /// Creates a new `FsBlobStore` with a custom file name template.
    pub fn with_template<P: Into<PathBuf>>(dir: P, prefix: &str, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file an entry is stored in.
    pub fn path(&self, key: &Key) -> PathBuf {
        self.dir.join(self.file_name(key))
    }

    fn file_name(&self, key: &Key) -> String {
        format!("{}{}{}", self.prefix, key, self.extension)
    }

    /// Writes `blob` to a temporary sibling of `key`'s file without publishing it.
    ///
    /// Readers keep seeing the previous entry until the returned `StagedBlob` is
    /// committed. `put` is a `stage` immediately followed by a `commit`.
    ///
    /// # Errors
    /// Returns `StoreErr::Io` if the directory or the temporary file can't be written.
    pub fn stage(&self, key: &Key, blob: &[u8]) -> Result<StagedBlob> {
        fs::create_dir_all(&self.dir)?;

        let tmp = self.temp_path(key);
        if let Err(e) = write_synced(&tmp, blob) {
            // The temporary file may not exist if creating it was what failed.
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(StagedBlob {
            tmp,
            path: self.path(key),
            len: blob.len(),
            committed: false,
        })
    }

    /// A fresh, hidden sibling of the entry's file.
    fn temp_path(&self, key: &Key) -> PathBuf {
        let nonce: u64 = rand::random();
        self.dir
            .join(format!(".{}.{nonce:016x}.tmp", self.file_name(key)))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &Key, blob: &[u8]) -> Result<()> {
        self.stage(key, blob)?.commit()
    }

    fn get(&self, key: &Key) -> Result<Vec<u8>> {
        fs::read(self.path(key)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreErr::NotFound(key.to_string()),
            _ => StoreErr::Io(e),
        })
    }
}

/// A fully written blob waiting to replace its entry.
///
/// Dropping it without committing removes the temporary file and leaves the entry
/// untouched.
#[derive(Debug)]
pub struct StagedBlob {
    tmp: PathBuf,
    path: PathBuf,
    len: usize,
    committed: bool,
}

impl StagedBlob {
    /// Returns the temporary file the blob was written to.
    pub fn temp_path(&self) -> &Path {
        &self.tmp
    }

    /// Renames the temporary file over the entry.
    ///
    /// # Errors
    /// Returns `StoreErr::Io` if the rename fails, in which case the entry is unchanged.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.path)?;
        self.committed = true;

        debug!("wrote {} bytes to {}", self.len, self.path.display());
        Ok(())
    }
}

impl Drop for StagedBlob {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

fn write_synced(path: &Path, blob: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(blob)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fs_blob_{name}_{:016x}", rand::random::<u64>()))
    }

    #[test]
    fn test_path_template() {
        let store = FsBlobStore::new("model");
        let key = Key::parse("42").unwrap();
        assert_eq!(store.path(&key), Path::new("model/model_user_42.pkl"));
    }

    #[test]
    fn test_put_creates_directory_and_overwrites() {
        let dir = temp_dir("overwrite");
        let store = FsBlobStore::new(dir.join("nested"));
        let key = Key::parse("alice").unwrap();

        store.put(&key, b"first").unwrap();
        store.put(&key, b"second").unwrap();
        assert_eq!(store.get(&key).unwrap(), b"second");

        // Only the entry itself is left behind.
        let files: Vec<_> = fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(files.len(), 1);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_abandoned_stage_leaves_the_entry_alone() {
        let dir = temp_dir("abandoned");
        let store = FsBlobStore::new(&dir);
        let key = Key::parse("carol").unwrap();

        store.put(&key, b"kept").unwrap();
        let staged = store.stage(&key, b"dropped").unwrap();
        let tmp = staged.temp_path().to_path_buf();
        assert!(tmp.is_file());
        assert_eq!(store.get(&key).unwrap(), b"kept");

        drop(staged);
        assert!(!tmp.exists());
        assert_eq!(store.get(&key).unwrap(), b"kept");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let dir = temp_dir("missing");
        let store = FsBlobStore::new(&dir);
        let key = Key::parse("nobody").unwrap();
        assert!(matches!(store.get(&key), Err(StoreErr::NotFound(k)) if k == "nobody"));
    }

    #[test]
    fn test_unwritable_directory_is_an_io_error() {
        let dir = temp_dir("unwritable");
        fs::write(&dir, b"a file, not a directory").unwrap();

        let store = FsBlobStore::new(&dir);
        let key = Key::parse("bob").unwrap();
        assert!(matches!(store.put(&key, b"x"), Err(StoreErr::Io(_))));

        fs::remove_file(dir).unwrap();
    }
}
