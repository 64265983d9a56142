//! Durable slot holding the serialized cart between runs.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rakhshan_core::CartLineItem;
use thiserror::Error;

/// Errors raised by a [`CartStore`].
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Reading or writing the slot failed.
    #[error("cart store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The slot holds something that is not a cart.
    #[error("cart snapshot is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The slot is unavailable (e.g., a poisoned lock).
    #[error("cart store unavailable: {0}")]
    Unavailable(String),
}

/// A single named slot holding the whole cart.
///
/// `load` runs once at start; `save` overwrites the slot after every
/// mutation.
pub trait CartStore: Send + Sync {
    /// Read the persisted cart. An empty slot yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or does not hold a cart.
    fn load(&self) -> Result<Vec<CartLineItem>, CartStoreError>;

    /// Overwrite the slot with `lines`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn save(&self, lines: &[CartLineItem]) -> Result<(), CartStoreError>;
}

// =============================================================================
// FileCartStore
// =============================================================================

/// Cart slot backed by a JSON file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// slot, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: PathBuf,
}

impl FileCartStore {
    /// Create a store for the file at `path`. Nothing is touched until the
    /// first load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the slot.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CartStoreError {
        CartStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CartStore for FileCartStore {
    fn load(&self) -> Result<Vec<CartLineItem>, CartStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, lines: &[CartLineItem]) -> Result<(), CartStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec(lines)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))
    }
}

// =============================================================================
// MemoryCartStore
// =============================================================================

/// Cart slot held in memory as serialized JSON.
///
/// Goes through the same serialization as the file store, which makes it a
/// faithful stand-in for embedders and tests.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCartStore {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-filled with `lines`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be serialized.
    pub fn with_lines(lines: &[CartLineItem]) -> Result<Self, CartStoreError> {
        Ok(Self {
            slot: Mutex::new(Some(serde_json::to_string(lines)?)),
        })
    }

    /// The raw JSON currently in the slot.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Result<Vec<CartLineItem>, CartStoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| CartStoreError::Unavailable(e.to_string()))?;
        match slot.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, lines: &[CartLineItem]) -> Result<(), CartStoreError> {
        let json = serde_json::to_string(lines)?;
        *self
            .slot
            .lock()
            .map_err(|e| CartStoreError::Unavailable(e.to_string()))? = Some(json);
        Ok(())
    }
}

impl<S: CartStore + ?Sized> CartStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Vec<CartLineItem>, CartStoreError> {
        (**self).load()
    }

    fn save(&self, lines: &[CartLineItem]) -> Result<(), CartStoreError> {
        (**self).save(lines)
    }
}
