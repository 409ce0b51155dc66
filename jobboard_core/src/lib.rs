//! Job Board Core
//!
//! Entity store for job postings and applications:
//! - Types: jobs, applications, statuses, the trusted current user
//! - Store: owned collections plus every mutation
//! - Views: filters and joins recomputed per call
//! - Persistence: the storage trait and its SQLite / file / memory backends

pub mod error;
pub mod ids;
pub mod persistence;
pub mod seed;
pub mod store;
pub mod types;
pub mod views;

pub use error::{StorageError, StoreError, StoreResult};
pub use ids::{IdGenerator, IdStrategy, TimestampIdGenerator, UuidIdGenerator};
pub use persistence::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::{JobStore, StoreOptions};
pub use types::*;
pub use views::{ApplicationStats, ApplicationWithJob, BoardSummary, JobSearch};

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
