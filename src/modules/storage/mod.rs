//! Key-value storage areas backing the account directory.
//!
//! A store behaves like a browser storage area: string keys map to string
//! values, and absent keys read as `None`. Collections are kept as JSON text
//! under a single key and rewritten whole on every change.

mod file;
mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a storage area
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed data under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// A string-keyed storage area
pub trait KeyValueStore {
    /// Read the raw value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing an absent key is not an error
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read and parse the JSON value under `key`, falling back to `T::default()` when absent
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match store.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// Serialize `value` as JSON and store it under `key`
pub fn write_json<T>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let data = serde_json::to_string(value).map_err(|source| StorageError::Malformed {
        key: key.to_string(),
        source,
    })?;
    store.set_item(key, &data)
}
