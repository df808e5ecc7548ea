//! Record cache keyed by the six digit `YYMMDD` date key.
//!
//! A [`RecordCache`] is loaded once from a [`CacheStore`] and written back
//! in full after every insertion. Entries are never evicted. Storage
//! failures never surface to callers: a missing or corrupt store loads as an
//! empty cache and failed saves are logged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::Result;
use crate::record::Record;

/// Map of date key to record, as persisted.
pub type CacheMap = BTreeMap<String, Record>;

const CACHE_DIR: &str = "apod";
const CACHE_FILE: &str = "apod_cache.json";

/// Durable storage behind a [`RecordCache`].
pub trait CacheStore: Send + Sync {
    /// Reads the whole persisted map.
    fn load(&self) -> Result<CacheMap>;

    /// Replaces the persisted map.
    fn save(&self, entries: &CacheMap) -> Result<()>;
}

/// Stores the cache as one pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<user cache dir>/apod/apod_cache.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(CACHE_DIR).join(CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<CacheMap> {
        if !self.path.exists() {
            return Ok(CacheMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &CacheMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Shared in-memory store. Clones see the same map, so building a second
/// cache from a clone behaves like a process restart over the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<CacheMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<CacheMap> {
        Ok(self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, entries: &CacheMap) -> Result<()> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries.clone();
        Ok(())
    }
}

/// In-process record cache backed by a [`CacheStore`].
///
/// Saves run on the inserting thread and are serialized by their own lock,
/// so a slow store never blocks lookups.
pub struct RecordCache {
    entries: Mutex<CacheMap>,
    store: Mutex<Box<dyn CacheStore>>,
}

impl RecordCache {
    /// Loads the cache from `store`. Any load failure yields an empty cache.
    pub fn load(store: impl CacheStore + 'static) -> Self {
        let entries = match store.load() {
            Ok(entries) => {
                debug!(entries = entries.len(), "loaded record cache");
                entries
            }
            Err(e) => {
                warn!(error = %e, "failed to load record cache, starting empty");
                CacheMap::new()
            }
        };

        Self { entries: Mutex::new(entries), store: Mutex::new(Box::new(store)) }
    }

    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::load(MemoryStore::new())
    }

    pub fn get(&self, key: &str) -> Option<Record> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Inserts a record under `key` and persists the whole map.
    pub fn insert(&self, key: impl Into<String>, record: Record) {
        self.lock().insert(key.into(), record);

        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.lock().clone();

        if let Err(e) = store.save(&snapshot) {
            warn!(error = %e, "failed to save record cache");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheMap> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RecordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCache").field("entries", &self.len()).finish()
    }
}
