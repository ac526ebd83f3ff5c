//! Quarry Storage Layer
//!
//! Implements the `RecordStore` trait twice:
//!
//! - [`MemoryStore`]: a `RwLock`-guarded vector, for tests and short-lived agents
//! - [`SqliteStore`]: a durable SQLite database, one transaction per append
//!
//! Both validate records before accepting them and keep insertion order for
//! records that share a timestamp.
//!
//! # Examples
//!
//! ```
//! use quarry_domain::{ScoredRecord, SourceUsage};
//! use quarry_domain::traits::RecordStore;
//! use quarry_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let record = ScoredRecord::new("rust async", 0.8, 0.7, vec![SourceUsage::new("web", 90, true)], 1_000);
//! let id = store.append(record).unwrap();
//! assert_eq!(store.read_recent(1).unwrap()[0].id, id);
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use quarry_domain::ValidationError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record rejected before storage
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A record with this id already exists
    #[error("Duplicate record id: {0}")]
    Duplicate(String),

    /// A lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}
