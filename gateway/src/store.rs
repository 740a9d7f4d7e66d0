//! Ledger backends and per-request sessions.

use std::collections::BTreeMap;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use supplychain_common::{KeyValueStore, MemoryStore, StoreError};
use tokio::sync::{Mutex, MutexGuard};

/// Durable store: the whole ordered map is rewritten to `path` after every
/// put, via a temp file and a rename so a crash never leaves half a snapshot.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => bincode::deserialize(&bytes).map_err(|e| {
                StoreError::Io(format!("unreadable snapshot {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(&path, e)),
        };
        tracing::info!(path = %path.display(), records = entries.len(), "opened ledger file");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let bytes = bincode::serialize(&self.entries)
            .map_err(|e| StoreError::Io(format!("failed to encode snapshot: {}", e)))?;
        let tmp = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        file.write_all(&bytes).map_err(|e| io_error(&tmp, e))?;
        // The snapshot must be on disk before it replaces the old one.
        file.sync_all().map_err(|e| io_error(&tmp, e))?;
        drop(file);
        std::fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            // Keep memory in step with disk.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

type SharedStore = Box<dyn KeyValueStore + Send>;

/// Handle to the ledger shared by all request handlers.
///
/// Cheaply cloneable; every clone talks to the same store.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<Mutex<SharedStore>>,
}

impl Ledger {
    pub fn new(store: impl KeyValueStore + Send + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open a session for one operation.
    ///
    /// Sessions are exclusive: operations on the ledger run one at a time,
    /// and the session is released when dropped, whatever the outcome.
    pub async fn connect(&self) -> LedgerSession<'_> {
        let guard = self.store.lock().await;
        tracing::trace!("ledger session opened");
        LedgerSession {
            guard,
            opened: Instant::now(),
        }
    }
}

pub struct LedgerSession<'a> {
    guard: MutexGuard<'a, SharedStore>,
    opened: Instant,
}

impl Deref for LedgerSession<'_> {
    type Target = dyn KeyValueStore + Send;

    fn deref(&self) -> &Self::Target {
        &**self.guard
    }
}

impl DerefMut for LedgerSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.guard
    }
}

impl Drop for LedgerSession<'_> {
    fn drop(&mut self) {
        tracing::trace!(held_us = self.opened.elapsed().as_micros() as u64, "ledger session released");
    }
}
