//! Persistence Shim
//!
//! Blob storage for the serialized collections. Each key holds one JSON
//! document; keys are written independently with no multi-key transaction,
//! so the jobs and applications blobs can drift apart if a process dies
//! between the two writes.

use crate::error::StorageError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub const JOBS_KEY: &str = "jobs";
pub const APPLICATIONS_KEY: &str = "applications";

/// Injected storage interface for `JobStore`.
pub trait KeyValueStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;
}

// ============================================================
// SQLITE
// ============================================================

const KV_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_blobs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// SQLite-backed blob store
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the database file at `db_path`
    pub fn new(db_path: Option<PathBuf>) -> Result<Self, StorageError> {
        let path = db_path.unwrap_or_else(|| PathBuf::from("job_board.db"));
        log::info!("[storage] Opening SQLite store at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute(KV_SCHEMA, [])?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store for testing
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(KV_SCHEMA, [])?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM kv_blobs ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStorage for SqliteStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, blob, Utc::now().to_rfc3339()],
        )?;
        log::debug!("[storage] Saved {} ({} bytes) to SQLite", key, blob.len());
        Ok(())
    }
}

// ============================================================
// FILES
// ============================================================

/// One `<key>.json` file per key inside a data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("[storage] Using data directory {}", dir.display());
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

/// Write through a temporary file in the target's directory and rename it into place.
fn atomic_write(target: &Path, content: &str) -> Result<(), StorageError> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        log::error!("[storage] Failed to create temporary file in {:?}: {}", parent, e);
        e
    })?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    temp_file.persist(target).map_err(|e| {
        log::error!("[storage] Failed to persist temporary file to {:?}", target);
        e.error
    })?;

    Ok(())
}

impl KeyValueStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        atomic_write(&self.path_for(key), blob)?;
        log::debug!("[storage] Saved {} ({} bytes) to file", key, blob.len());
        Ok(())
    }
}

// ============================================================
// IN-MEMORY
// ============================================================

/// Process-local blob map. Counts saves so tests can check write behaviour.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, String>>,
    save_count: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if a previous session had saved it.
    pub fn with_blob(self, key: &str, blob: &str) -> Self {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.to_string(), blob.to_string());
        }
        self
    }

    pub fn save_count(&self) -> usize {
        self.save_count.lock().map(|c| *c).unwrap_or(0)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blobs = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        blobs.insert(key.to_string(), blob.to_string());
        let mut count = self.save_count.lock().map_err(|_| StorageError::Poisoned)?;
        *count += 1;
        Ok(())
    }
}

/// Lets a caller keep a handle on the storage it hands to the store.
impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        (**self).save(key, blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_storage_upserts() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert_eq!(storage.load(JOBS_KEY).unwrap(), None);

        storage.save(JOBS_KEY, "[]").unwrap();
        storage.save(JOBS_KEY, r#"[{"id":"1"}]"#).unwrap();
        storage.save(APPLICATIONS_KEY, "[]").unwrap();

        assert_eq!(storage.load(JOBS_KEY).unwrap().as_deref(), Some(r#"[{"id":"1"}]"#));
        assert_eq!(storage.keys().unwrap(), vec!["applications", "jobs"]);
    }

    #[test]
    fn test_file_storage_overwrites_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data")).unwrap();

        assert_eq!(storage.load(APPLICATIONS_KEY).unwrap(), None);

        storage.save(APPLICATIONS_KEY, "old").unwrap();
        storage.save(APPLICATIONS_KEY, "new").unwrap();

        assert_eq!(storage.load(APPLICATIONS_KEY).unwrap().as_deref(), Some("new"));
        assert!(storage.path_for(APPLICATIONS_KEY).exists());
    }

    #[test]
    fn test_memory_storage_counts_saves() {
        let storage = MemoryStorage::new().with_blob(JOBS_KEY, "[]");
        assert_eq!(storage.load(JOBS_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.save_count(), 0);

        storage.save(JOBS_KEY, "[1]").unwrap();
        assert_eq!(storage.save_count(), 1);
    }
}
