//! Key/value store backends

use super::{KeyValueStore, SessionError, SessionResult};
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| SessionError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> SessionResult<()> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SessionResult<()> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> SessionResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| SessionError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    fn clear(&self) -> SessionResult<()> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.clear();
        Ok(())
    }
}

const SESSION_CF: &str = "session";

/// RocksDB-backed store
pub struct RocksStore {
    db: Arc<DB>,
    path: String,
}

impl RocksStore {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        info!("Opening session store at: {}", path_str);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(SESSION_CF, Self::session_cf_options()),
        ];

        let db = DB::open_cf_descriptors(&opts, &path_str, cf_descriptors)?;

        info!("Session store opened successfully");

        Ok(Self {
            db: Arc::new(db),
            path: path_str,
        })
    }

    fn session_cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn cf(&self) -> SessionResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(SESSION_CF)
            .ok_or_else(|| SessionError::ColumnFamily(SESSION_CF.to_string()))
    }
}

impl KeyValueStore for RocksStore {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let cf = self.cf()?;
        Ok(self
            .db
            .get_cf(cf, key.as_bytes())?
            .map(|v| String::from_utf8_lossy(&v).into_owned()))
    }

    fn put(&self, key: &str, value: &str) -> SessionResult<()> {
        let cf = self.cf()?;
        self.db.put_cf(cf, key.as_bytes(), value.as_bytes())?;
        debug!("Stored session key {}", key);
        Ok(())
    }

    fn delete(&self, key: &str) -> SessionResult<()> {
        let cf = self.cf()?;
        self.db.delete_cf(cf, key.as_bytes())?;
        debug!("Deleted session key {}", key);
        Ok(())
    }

    fn keys(&self) -> SessionResult<Vec<String>> {
        let cf = self.cf()?;
        let mut keys = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    fn flush(&self) -> SessionResult<()> {
        self.db.flush()?;
        debug!("Flushed session store to disk");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("a").unwrap(), None);

        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        store.put("a", "3").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_rocks_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = RocksStore::open(temp_dir.path()).unwrap();
        exercise(&store);
    }

    #[test]
    fn test_rocks_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(temp_dir.path()).unwrap();
            store.put("personaTags", "[\"indie\"]").unwrap();
            store.flush().unwrap();
        }

        let store = RocksStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.get("personaTags").unwrap().as_deref(), Some("[\"indie\"]"));
    }
}
