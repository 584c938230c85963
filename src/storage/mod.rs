//! Storage module for persisting extracted records
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Idempotent upserts keyed by the site's natural ids
//! - Record lookups and per-kind counts

mod records;
mod schema;
mod sqlite;
mod traits;

pub use records::{
    Answer, Author, Comment, PostRef, Question, RecordKind, StoredRecord, UpsertOutcome, User,
};
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use std::path::Path;
use std::sync::{Arc, Mutex};

/// A store shared between dispatch workers
pub type SharedStore = Arc<Mutex<SqliteStore>>;

/// Opens the record store and wraps it for sharing across workers
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SharedStore)` - Successfully opened store
/// * `Err(StorageError)` - The database could not be opened or initialized
pub fn open_store(path: &Path) -> StorageResult<SharedStore> {
    let store = SqliteStore::new(path)?;
    Ok(Arc::new(Mutex::new(store)))
}
