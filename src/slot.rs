//! Durable slot
//!
//! The one piece of global mutable state — the persisted cart — lives
//! behind this narrow key-value contract, so the storage medium can be
//! swapped (in-memory map, file, session store) without touching callers.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use thiserror::Error;

/// Errors raised by a slot backend.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Underlying storage I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A persistent key-value slot scoped to one client.
///
/// A missing key is `Ok(None)`, not an error; errors are reserved for the
/// backend actually failing to read or write.
pub trait DurableSlot {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the backend failed to read.
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the backend failed to write.
    fn write(&self, key: &str, value: &str) -> Result<(), SlotError>;
}

/// In-process slot backend for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    /// Creates an empty in-memory slot.
    #[must_use]
    pub fn new() -> Self {
        MemorySlot::default()
    }
}

impl DurableSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        entries.insert(key.to_string(), value.to_string());

        Ok(())
    }
}

/// File-backed slot: one JSON file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Creates a slot rooted at the given directory. The directory is
    /// created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSlot { dir: dir.into() }
    }

    /// The directory holding this slot's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DurableSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;

        Ok(())
    }
}
