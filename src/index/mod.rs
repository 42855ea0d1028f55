//! The server-side per-file signature index (spec section 4.2): an
//! in-memory registry guarded by a single mutex, with durable persistence.
//!
//! Per the Design Notes in spec section 9 ("Global registry → scoped
//! state"), the registry is never exposed as a bare global. [`Store`] is the
//! handle each connection worker holds instead: a cheap `Clone`, with the
//! mutex encapsulated inside.

mod entry;
mod persist;
mod registry;

#[cfg(test)]
mod tests;

pub use entry::FileEntry;
pub use registry::Registry;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::IndexResult;

/// A cloneable handle to the shared index registry.
///
/// The lock is held only for the duration of a lookup ([`Store::find`]) or a
/// commit ([`Store::commit`]) — never across network I/O (spec section 5).
#[derive(Clone)]
pub struct Store {
    path: Arc<PathBuf>,
    registry: Arc<Mutex<Registry>>,
}

impl Store {
    /// Loads the registry from `path` (or starts empty if absent), returning
    /// a handle ready to be cloned into each connection worker.
    pub fn open(path: impl Into<PathBuf>) -> IndexResult<Self> {
        let path = path.into();
        let registry = persist::load(&path)?;
        Ok(Self { path: Arc::new(path), registry: Arc::new(Mutex::new(registry)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up `name`'s entry, cloning it out from behind the lock so
    /// callers can diff against it without holding the mutex.
    pub fn find(&self, name: &str) -> Option<FileEntry> {
        let registry = self.registry.lock().expect("index mutex poisoned");
        registry.find(name).cloned()
    }

    /// Replaces (or adds) `entry` and durably persists the whole registry.
    ///
    /// On a save failure the in-memory registry still reflects `entry` — only
    /// the error is surfaced, per spec section 7's `IoError` policy for the
    /// index: "the in-memory update still stands".
    pub fn commit(&self, entry: FileEntry) -> IndexResult<()> {
        let mut registry = self.registry.lock().expect("index mutex poisoned");
        registry.replace_or_add(entry);
        persist::save(&self.path, &registry)
    }

    /// Number of tracked files. Exposed for diagnostics and tests.
    pub fn len(&self) -> usize {
        self.registry.lock().expect("index mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
