//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::storage::records::{
    Answer, Comment, PostRef, Question, RecordKind, StoredRecord, UpsertOutcome, User,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Document store with upsert-by-natural-key semantics
///
/// Every upsert is insert-or-ignore: writing a record whose natural key is
/// already present leaves the stored row untouched and reports
/// [`UpsertOutcome::Existing`]. Repeated runs over the same pages therefore
/// never create new rows.
pub trait RecordStore {
    /// Looks a record up by its site-assigned id
    fn find_by_natural_key(
        &self,
        kind: RecordKind,
        key: i64,
    ) -> StorageResult<Option<StoredRecord>>;

    fn upsert_user(&mut self, user: &User) -> StorageResult<UpsertOutcome>;

    /// Stores the question row and its tags
    ///
    /// The author and comments are separate records.
    fn upsert_question(&mut self, question: &Question) -> StorageResult<UpsertOutcome>;

    /// Stores the answer row; the author and comments are separate records
    fn upsert_answer(&mut self, answer: &Answer) -> StorageResult<UpsertOutcome>;

    fn upsert_comment(&mut self, post: PostRef, comment: &Comment)
        -> StorageResult<UpsertOutcome>;

    /// Number of stored records of one kind
    fn count(&self, kind: RecordKind) -> StorageResult<u64>;
}
