//! Plain record types produced by extraction and persisted by natural key

use std::fmt;

/// A registered site user, keyed by the site's own user id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: i64,
    pub username: String,
}

/// Who wrote a post or comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    Registered(User),
    /// Display name only; never stored as a user row
    Anonymous(String),
}

impl Author {
    pub fn uid(&self) -> Option<i64> {
        match self {
            Self::Registered(user) => Some(user.uid),
            Self::Anonymous(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Registered(user) => &user.username,
            Self::Anonymous(name) => name,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Registered(user) => Some(user),
            Self::Anonymous(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub cid: i64,
    pub author: Author,
    /// Inner HTML of the comment text
    pub content: String,
    pub score: i64,
    pub comment_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub qid: i64,
    pub author: Author,
    pub title: String,
    /// Inner HTML of the post body
    pub content: String,
    pub upvote_count: i64,
    pub favorite_count: Option<i64>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub asked_time: String,
    pub activity_time: Option<String>,
    /// Community wiki posts have no single owner
    pub wiki: bool,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub aid: i64,
    pub qid: i64,
    pub author: Author,
    pub content: String,
    pub upvote_count: i64,
    pub accepted: bool,
    pub answered_time: Option<String>,
    pub wiki: bool,
    pub comments: Vec<Comment>,
}

/// The kinds of record addressable by natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    Question,
    Answer,
    Comment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [Self::User, Self::Question, Self::Answer, Self::Comment];

    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Question => "questions",
            Self::Answer => "answers",
            Self::Comment => "comments",
        }
    }

    pub(crate) fn key_column(&self) -> &'static str {
        match self {
            Self::User => "uid",
            Self::Question => "qid",
            Self::Answer => "aid",
            Self::Comment => "cid",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// The post a comment is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostRef {
    Question(i64),
    Answer(i64),
}

impl PostRef {
    pub(crate) fn id(&self) -> i64 {
        match self {
            Self::Question(id) | Self::Answer(id) => *id,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Question(_) => "question",
            Self::Answer(_) => "answer",
        }
    }
}

/// Result of an idempotent upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// The natural key was already present; nothing changed
    Existing,
}

impl UpsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// A stored record located by natural key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub kind: RecordKind,
    pub key: i64,
    /// RFC 3339 time of first insertion
    pub stored_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_accessors() {
        let registered = Author::Registered(User {
            uid: 7,
            username: "alice".to_string(),
        });
        assert_eq!(registered.uid(), Some(7));
        assert_eq!(registered.name(), "alice");

        let anonymous = Author::Anonymous("user123".to_string());
        assert_eq!(anonymous.uid(), None);
        assert_eq!(anonymous.name(), "user123");
        assert!(anonymous.user().is_none());
    }

    #[test]
    fn test_post_ref() {
        assert_eq!(PostRef::Answer(5).id(), 5);
        assert_eq!(PostRef::Question(9).kind(), "question");
    }
}
