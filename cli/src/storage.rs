//! File-backed storage: one file per storage key under the data directory.

use std::fs;
use std::path::PathBuf;

use tally_engine::error::{Error, Result};
use tally_engine::KeyValueStorage;

/// Key-value storage backed by plain files.
///
/// Each key maps to a file of the same name inside `dir`. Reads treat any
/// IO failure as an absent value, per the storage contract; write failures
/// surface as [`Error::WriteFailed`] for the store to absorb.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(self.dir.join(key), value).map_err(|e| Error::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().to_path_buf());
        storage.write("counters", "[1,2,3]").unwrap();
        assert_eq!(storage.read("counters"), Some("[1,2,3]".to_string()));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());
        assert_eq!(storage.read("counters"), None);
    }

    #[test]
    fn write_creates_the_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut storage = FileStorage::new(nested.clone());
        storage.write("sortMode", "name-asc").unwrap();
        assert!(nested.join("sortMode").exists());
    }
}
