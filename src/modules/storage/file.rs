use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

/// Directory-backed storage area, one `<key>.json` file per entry
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys become file names, so nothing that could escape the root
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::write(&path, value).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get_item("arewadeliver_users").unwrap(), None);

        store.set_item("arewadeliver_users", "[]").unwrap();
        assert!(dir.path().join("arewadeliver_users.json").exists());
        assert_eq!(
            store.get_item("arewadeliver_users").unwrap().as_deref(),
            Some("[]")
        );

        store.remove_item("arewadeliver_users").unwrap();
        assert_eq!(store.get_item("arewadeliver_users").unwrap(), None);
        assert!(store.remove_item("arewadeliver_users").is_ok());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.set_item("tokens", "{\"a\":1}").unwrap();
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get_item("tokens").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        for key in ["", "../escape", "nested/key", ".hidden"] {
            assert!(matches!(
                store.set_item(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
