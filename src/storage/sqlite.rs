//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::records::{
    Answer, Comment, PostRef, Question, RecordKind, StoredRecord, UpsertOutcome, User,
};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Tags stored for a question, sorted
    pub fn question_tags(&self, qid: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM question_tags WHERE qid = ?1 ORDER BY tag")?;
        let tags = stmt
            .query_map(params![qid], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }
}

fn outcome(changed: usize) -> UpsertOutcome {
    if changed == 0 {
        UpsertOutcome::Existing
    } else {
        UpsertOutcome::Inserted
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

impl RecordStore for SqliteStore {
    fn find_by_natural_key(
        &self,
        kind: RecordKind,
        key: i64,
    ) -> StorageResult<Option<StoredRecord>> {
        let query = format!(
            "SELECT stored_at FROM {} WHERE {} = ?1",
            kind.table(),
            kind.key_column()
        );

        let stored_at: Option<String> = self
            .conn
            .query_row(&query, params![key], |row| row.get(0))
            .optional()?;

        Ok(stored_at.map(|stored_at| StoredRecord {
            kind,
            key,
            stored_at,
        }))
    }

    fn upsert_user(&mut self, user: &User) -> StorageResult<UpsertOutcome> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO users (uid, username, stored_at) VALUES (?1, ?2, ?3)",
            params![user.uid, user.username, now()],
        )?;
        Ok(outcome(changed))
    }

    fn upsert_question(&mut self, question: &Question) -> StorageResult<UpsertOutcome> {
        let tx = self.conn.transaction()?;

        let changed = tx.execute(
            "INSERT OR IGNORE INTO questions (qid, author_uid, author_name, title, content,
             upvote_count, favorite_count, view_count, asked_time, activity_time, wiki, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                question.qid,
                question.author.uid(),
                question.author.name(),
                question.title,
                question.content,
                question.upvote_count,
                question.favorite_count,
                question.view_count,
                question.asked_time,
                question.activity_time,
                question.wiki,
                now(),
            ],
        )?;

        if changed > 0 {
            for tag in &question.tags {
                tx.execute(
                    "INSERT OR IGNORE INTO question_tags (qid, tag) VALUES (?1, ?2)",
                    params![question.qid, tag],
                )?;
            }
        }

        tx.commit()?;
        Ok(outcome(changed))
    }

    fn upsert_answer(&mut self, answer: &Answer) -> StorageResult<UpsertOutcome> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO answers (aid, qid, author_uid, author_name, content,
             upvote_count, accepted, answered_time, wiki, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                answer.aid,
                answer.qid,
                answer.author.uid(),
                answer.author.name(),
                answer.content,
                answer.upvote_count,
                answer.accepted,
                answer.answered_time,
                answer.wiki,
                now(),
            ],
        )?;
        Ok(outcome(changed))
    }

    fn upsert_comment(
        &mut self,
        post: PostRef,
        comment: &Comment,
    ) -> StorageResult<UpsertOutcome> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO comments (cid, post_id, post_kind, author_uid, author_name,
             content, score, comment_time, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                comment.cid,
                post.id(),
                post.kind(),
                comment.author.uid(),
                comment.author.name(),
                comment.content,
                comment.score,
                comment.comment_time,
                now(),
            ],
        )?;
        Ok(outcome(changed))
    }

    fn count(&self, kind: RecordKind) -> StorageResult<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
