//! # Persistence
//!
//! Round-trips the canvas element list through a string-keyed store such as
//! browser local storage.
//!
//! ```text
//! CanvasStore ──save──▶ JSON array ──set("canvasElements")──▶ KeyValueStorage
//! CanvasStore ◀─replace─ Vec<CanvasElement> ◀──load── KeyValueStorage
//! ```
//!
//! Absent or unreadable documents load as an empty canvas; only failures of
//! the storage itself surface as [`PersistError`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::ser::Error as _;

use crate::element::CanvasElement;
use crate::error::PersistError;
use crate::store::CanvasStore;

/// Storage key holding the serialized element list.
pub const ELEMENTS_KEY: &str = "canvasElements";

/// A string-keyed text store.
///
/// Methods take `&self` so one storage can back several adapters (elements
/// and settings) and be shared with the auto-save task.
pub trait KeyValueStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be modified.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        (**self).remove(key)
    }
}

/// Process-local storage, used in tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let values = self
            .values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sanitize a storage key for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Serialize an element list to its stored JSON form.
///
/// # Errors
///
/// Returns an error if serialization fails or an element has a non-finite
/// position or size, which JSON cannot represent.
pub fn encode_elements(elements: &[CanvasElement]) -> Result<String, PersistError> {
    let finite = |e: &CanvasElement| {
        e.position.is_finite() && e.size.width.is_finite() && e.size.height.is_finite()
    };
    if let Some(bad) = elements.iter().find(|e| !finite(e)) {
        return Err(PersistError::Serialization(serde_json::Error::custom(format!(
            "element {} has non-finite geometry",
            bad.id
        ))));
    }
    Ok(serde_json::to_string(elements)?)
}

/// Parse a stored element list.
///
/// # Errors
///
/// Returns an error if `json` is not an array of element records.
pub fn decode_elements(json: &str) -> Result<Vec<CanvasElement>, PersistError> {
    Ok(serde_json::from_str(json)?)
}

/// Saves and loads a canvas's elements under a fixed key.
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> Persistence<S> {
    /// Persist under the default [`ELEMENTS_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, ELEMENTS_KEY)
    }

    /// Persist under a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The key elements are stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the store's elements and mark it clean.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if serialization or the write fails; the store
    /// stays dirty so a later save can retry.
    pub fn save(&self, store: &mut CanvasStore) -> Result<(), PersistError> {
        let json = encode_elements(store.elements())?;
        if let Err(e) = self.storage.set(&self.key, &json) {
            tracing::warn!("Failed to save canvas under {}: {e}", self.key);
            return Err(e);
        }
        store.mark_saved();
        tracing::debug!(count = store.len(), key = %self.key, "Canvas saved");
        Ok(())
    }

    /// Save only if the store has unsaved changes. Returns whether a save
    /// happened.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the save was attempted and failed.
    pub fn save_if_dirty(&self, store: &mut CanvasStore) -> Result<bool, PersistError> {
        if !store.is_dirty() {
            return Ok(false);
        }
        self.save(store)?;
        Ok(true)
    }

    /// Read the stored element list.
    ///
    /// A missing or malformed document yields an empty list and is logged.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] only if the storage itself cannot be read.
    pub fn load(&self) -> Result<Vec<CanvasElement>, PersistError> {
        let Some(json) = self.storage.get(&self.key)? else {
            tracing::debug!(key = %self.key, "No saved canvas, starting empty");
            return Ok(Vec::new());
        };
        match decode_elements(&json) {
            Ok(elements) => {
                tracing::debug!(count = elements.len(), key = %self.key, "Canvas loaded");
                Ok(elements)
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed canvas under {}: {e}", self.key);
                Ok(Vec::new())
            }
        }
    }

    /// Load into `store`, replacing its elements. Returns the element count.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the storage cannot be read; the store is
    /// left untouched.
    pub fn restore(&self, store: &mut CanvasStore) -> Result<usize, PersistError> {
        let elements = self.load()?;
        store.replace_elements(elements);
        Ok(store.len())
    }

    /// Delete the stored element list.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the storage cannot be modified.
    pub fn forget(&self) -> Result<(), PersistError> {
        self.storage.remove(&self.key)
    }
}
