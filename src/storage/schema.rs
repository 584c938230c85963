//! Database schema definitions
//!
//! Every table is keyed by the site's own id so inserts can be idempotent.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Registered users
CREATE TABLE IF NOT EXISTS users (
    uid INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

-- Questions; author_uid is NULL for anonymous and wiki authors
CREATE TABLE IF NOT EXISTS questions (
    qid INTEGER PRIMARY KEY,
    author_uid INTEGER,
    author_name TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    upvote_count INTEGER NOT NULL,
    favorite_count INTEGER,
    view_count INTEGER NOT NULL,
    asked_time TEXT NOT NULL,
    activity_time TEXT,
    wiki INTEGER NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS question_tags (
    qid INTEGER NOT NULL,
    tag TEXT NOT NULL,
    PRIMARY KEY (qid, tag)
);

-- Answers may arrive before their question is stored
CREATE TABLE IF NOT EXISTS answers (
    aid INTEGER PRIMARY KEY,
    qid INTEGER NOT NULL,
    author_uid INTEGER,
    author_name TEXT NOT NULL,
    content TEXT NOT NULL,
    upvote_count INTEGER NOT NULL,
    accepted INTEGER NOT NULL,
    answered_time TEXT,
    wiki INTEGER NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_answers_qid ON answers(qid);

CREATE TABLE IF NOT EXISTS comments (
    cid INTEGER PRIMARY KEY,
    post_id INTEGER NOT NULL,
    post_kind TEXT NOT NULL,
    author_uid INTEGER,
    author_name TEXT NOT NULL,
    content TEXT NOT NULL,
    score INTEGER NOT NULL,
    comment_time TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_kind, post_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["users", "questions", "question_tags", "answers", "comments"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
