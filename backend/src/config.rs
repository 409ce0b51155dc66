//! Server configuration read from the environment.

use jobboard_core::{
    FileStorage, IdStrategy, JobStore, KeyValueStorage, MemoryStorage, SqliteStorage, StoreOptions,
    StoreResult,
};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Sqlite(PathBuf),
    Files(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub seed_sample_jobs: bool,
    pub id_strategy: IdStrategy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageBackend::Sqlite(PathBuf::from("job_board.db")),
            seed_sample_jobs: true,
            id_strategy: IdStrategy::Timestamp,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset or unparsable values fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = get("HOST").unwrap_or(defaults.host);
        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("[config] Invalid PORT {:?}, using {}", raw, defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        let storage = match get("JOB_BOARD_STORAGE").as_deref().map(str::trim) {
            Some("files") => StorageBackend::Files(PathBuf::from(
                get("JOB_BOARD_DATA_DIR").unwrap_or_else(|| "data".to_string()),
            )),
            Some("memory") => StorageBackend::Memory,
            Some("sqlite") | None => StorageBackend::Sqlite(PathBuf::from(
                get("JOB_BOARD_DB").unwrap_or_else(|| "job_board.db".to_string()),
            )),
            Some(other) => {
                log::warn!("[config] Unknown JOB_BOARD_STORAGE {:?}, using sqlite", other);
                defaults.storage
            }
        };

        let seed_sample_jobs = match get("JOB_BOARD_SEED") {
            Some(raw) => !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
            None => defaults.seed_sample_jobs,
        };

        let id_strategy = get("JOB_BOARD_ID_STRATEGY")
            .and_then(|raw| IdStrategy::parse(&raw))
            .unwrap_or(defaults.id_strategy);

        Self {
            host,
            port,
            storage,
            seed_sample_jobs,
            id_strategy,
        }
    }

    pub fn open_store(&self) -> StoreResult<JobStore> {
        let storage: Box<dyn KeyValueStorage> = match &self.storage {
            StorageBackend::Sqlite(path) => Box::new(SqliteStorage::new(Some(path.clone()))?),
            StorageBackend::Files(dir) => Box::new(FileStorage::new(dir.clone())?),
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
        };
        JobStore::open(
            storage,
            StoreOptions {
                seed_sample_jobs: self.seed_sample_jobs,
                ids: self.id_strategy.generator(),
            },
        )
    }
}
