//! Flat-file data store
//!
//! One JSON array per collection, stored as `<base_dir>/<name>.json`.
//! Reads always return the whole collection and writes always replace the
//! whole file. Writes go through a temporary sibling and a rename so a
//! concurrent reader sees either the old array or the new one.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::StoreError;
use crate::logger;

/// A single record within a collection
pub type Entity = Map<String, Value>;

pub struct FileStore {
    base_dir: PathBuf,
    /// Per-collection writer locks, created on first use
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Read the full collection.
    ///
    /// A missing file or contents that are not a JSON array yield an empty
    /// collection. Only genuine I/O failures are returned as errors.
    pub async fn read_collection(&self, name: &str) -> Result<Vec<Entity>, StoreError> {
        match self.read_collection_strict(name).await {
            Err(StoreError::Corrupt { collection, source }) => {
                logger::log_warning(&format!(
                    "Collection '{collection}' is not a JSON array ({source}), treating as empty"
                ));
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// Read the full collection, failing with `StoreError::Corrupt` when the
    /// file exists but does not hold a JSON array.
    ///
    /// Read-modify-write callers use this so unparseable data is never
    /// overwritten.
    pub async fn read_collection_strict(&self, name: &str) -> Result<Vec<Entity>, StoreError> {
        let path = self.collection_path(name)?;

        let content = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    collection: name.to_string(),
                    source: e,
                })
            }
        };

        match serde_json::from_slice::<Vec<Value>>(&content) {
            Ok(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(entity) => Some(entity),
                    _ => None,
                })
                .collect()),
            Err(source) => Err(StoreError::Corrupt {
                collection: name.to_string(),
                source,
            }),
        }
    }

    /// Replace the collection file with `entities`.
    pub async fn update_collection(
        &self,
        name: &str,
        entities: &[Entity],
    ) -> Result<(), StoreError> {
        let path = self.collection_path(name)?;
        let io_err = |source| StoreError::Io {
            collection: name.to_string(),
            source,
        };

        let content =
            serde_json::to_vec_pretty(entities).map_err(|source| StoreError::Serialize {
                collection: name.to_string(),
                source,
            })?;

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(io_err)?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(io_err)?;

        logger::log_debug(&format!(
            "[Store] Wrote {} entities to {}",
            entities.len(),
            path.display()
        ));
        Ok(())
    }

    /// Acquire the writer lock for a collection.
    ///
    /// Every read-modify-write sequence on a collection must hold this guard
    /// for its whole duration.
    pub async fn lock_collection(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    fn collection_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_collection_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(format!("{name}.json")))
    }
}

fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}
