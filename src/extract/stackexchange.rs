//! StackExchange question and answer pages
//!
//! Depth 1 pages are question pages: the question is stored with its author,
//! tags and comments, followed by every answer on the page. Depth 2 pages are
//! further answer pages of the same question; the question id is taken from
//! the `/questions/<id>/...` path.
//!
//! A record that cannot be extracted is skipped with a warning and its
//! siblings on the same page are still processed.

use crate::crawler::ParsedPage;
use crate::extract::html::{
    all, attr, first, first_text, last, next_element, parse_count, require, text,
};
use crate::extract::{ExtractError, PageHandler};
use crate::storage::{
    Answer, Author, Comment, PostRef, Question, RecordStore, SharedStore, SqliteStore,
    StorageError, User,
};
use scraper::{ElementRef, Html};
use std::sync::MutexGuard;
use url::Url;

/// Question links on a listing page
pub(crate) const QUESTION_LINKS: &str = "#questions a.question-hyperlink";

/// Pagination links between answer pages of one question
pub(crate) const ANSWER_PAGES: &str = "div.pager-answers a";

/// Stores StackExchange records in a shared SQLite store
pub struct StackExchangeHandler {
    store: SharedStore,
}

impl StackExchangeHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteStore>, ExtractError> {
        self.store
            .lock()
            .map_err(|_| ExtractError::Storage(StorageError::Poisoned))
    }

    fn handle_question_page(&self, html: &Html, url: &str) -> Result<(), ExtractError> {
        let root = html.root_element();
        let question_el = first(root, "#question")?.ok_or_else(|| ExtractError::StructureMissing {
            element: "#question",
            url: url.to_string(),
        })?;

        match parse_question(root, question_el, url) {
            Ok(question) => self.store_question(&question)?,
            Err(e) => tracing::warn!("Skipping question on {}: {}", url, e),
        }

        let qid = question_el
            .value()
            .attr("data-questionid")
            .and_then(|id| id.trim().parse().ok())
            .or_else(|| question_id_from_url(url))
            .ok_or_else(|| ExtractError::FieldMissing {
                field: "data-questionid",
                url: url.to_string(),
            })?;

        self.handle_answers(root, qid, url)
    }

    fn handle_answer_page(&self, html: &Html, url: &str) -> Result<(), ExtractError> {
        let qid = question_id_from_url(url).ok_or_else(|| ExtractError::InvalidValue {
            field: "question id",
            value: url.to_string(),
            url: url.to_string(),
        })?;

        self.handle_answers(html.root_element(), qid, url)
    }

    fn handle_answers(&self, root: ElementRef<'_>, qid: i64, url: &str) -> Result<(), ExtractError> {
        let answers_el = first(root, "#answers")?.ok_or_else(|| ExtractError::StructureMissing {
            element: "#answers",
            url: url.to_string(),
        })?;

        for answer_el in all(answers_el, "div.answer")? {
            match parse_answer(answer_el, qid, url) {
                Ok(answer) => self.store_answer(&answer)?,
                Err(e) => tracing::warn!("Skipping answer on {}: {}", url, e),
            }
        }

        Ok(())
    }

    fn store_question(&self, question: &Question) -> Result<(), ExtractError> {
        let mut store = self.lock()?;

        store_author(&mut store, &question.author)?;
        if store.upsert_question(question)?.is_inserted() {
            tracing::info!("Added a question: {:?}", question.title);
        } else {
            tracing::debug!("Question {} is in the record", question.qid);
        }
        store_comments(&mut store, PostRef::Question(question.qid), &question.comments)
    }

    fn store_answer(&self, answer: &Answer) -> Result<(), ExtractError> {
        let mut store = self.lock()?;

        store_author(&mut store, &answer.author)?;
        if store.upsert_answer(answer)?.is_inserted() {
            tracing::info!("Added an answer by: {}", answer.author.name());
        } else {
            tracing::debug!("Answer {} is in the record", answer.aid);
        }
        store_comments(&mut store, PostRef::Answer(answer.aid), &answer.comments)
    }
}

impl PageHandler for StackExchangeHandler {
    fn handle(&self, page: &ParsedPage) -> Result<(), ExtractError> {
        let html = page.document.html();
        match page.depth {
            1 => self.handle_question_page(html, &page.url),
            2 => self.handle_answer_page(html, &page.url),
            depth => {
                tracing::debug!("Nothing to extract at depth {} ({})", depth, page.url);
                Ok(())
            }
        }
    }
}

fn store_author(store: &mut SqliteStore, author: &Author) -> Result<(), ExtractError> {
    if let Some(user) = author.user() {
        if store.upsert_user(user)?.is_inserted() {
            tracing::debug!("Added user {} ({})", user.username, user.uid);
        }
    }
    Ok(())
}

fn store_comments(
    store: &mut SqliteStore,
    post: PostRef,
    comments: &[Comment],
) -> Result<(), ExtractError> {
    for comment in comments {
        store_author(store, &comment.author)?;
        if store.upsert_comment(post, comment)?.is_inserted() {
            tracing::info!("Added a comment by: {}", comment.author.name());
        }
    }
    Ok(())
}

/// Extracts `<id>` from `/questions/<id>/<slug>`
fn question_id_from_url(url: &str) -> Option<i64> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    if segments.next()? != "questions" {
        return None;
    }
    segments.next()?.parse().ok()
}

/// Reads uid and username from a `/users/<uid>/<name>` profile link
fn user_from_profile_link(link: ElementRef<'_>, url: &str) -> Result<User, ExtractError> {
    let href = attr(link, "href", url)?;
    let mut parts = href.split('/').skip_while(|part| *part != "users").skip(1);

    let uid = parts
        .next()
        .and_then(|uid| uid.parse().ok())
        .ok_or_else(|| ExtractError::InvalidValue {
            field: "user link",
            value: href.clone(),
            url: url.to_string(),
        })?;
    let username = parts
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| text(link));

    Ok(User { uid, username })
}

/// Author of an owned post, from its `div.user-details`
fn owner_author(details: ElementRef<'_>, url: &str) -> Result<Author, ExtractError> {
    match first(details, "a")? {
        Some(link) => Ok(Author::Registered(user_from_profile_link(link, url)?)),
        None => first_text(details)
            .map(Author::Anonymous)
            .ok_or_else(|| ExtractError::FieldMissing {
                field: "user name",
                url: url.to_string(),
            }),
    }
}

/// Author of a community wiki post
///
/// The last `div.user-details` of the signature names the last editor. With two
/// links the second is the editor's profile; otherwise the first link's text
/// is all there is.
fn wiki_author(user_info: ElementRef<'_>, url: &str) -> Result<Author, ExtractError> {
    let details = last(user_info, "div.user-details")?.ok_or_else(|| ExtractError::FieldMissing {
        field: "div.user-details",
        url: url.to_string(),
    })?;
    let links = all(details, "a")?;

    if links.len() == 2 {
        let link = links[1];
        let mut user = user_from_profile_link(link, url)?;
        let name = text(link);
        if !name.is_empty() {
            user.username = name;
        }
        return Ok(Author::Registered(user));
    }

    links
        .first()
        .map(|link| text(*link))
        .or_else(|| first_text(details))
        .filter(|name| !name.is_empty())
        .map(Author::Anonymous)
        .ok_or_else(|| ExtractError::FieldMissing {
            field: "user name",
            url: url.to_string(),
        })
}

fn parse_question(
    root: ElementRef<'_>,
    question_el: ElementRef<'_>,
    url: &str,
) -> Result<Question, ExtractError> {
    let qid = parse_count(&attr(question_el, "data-questionid", url)?, "data-questionid", url)?;
    let title = text(require(root, "a.question-hyperlink", url)?);

    let post = require(question_el, "div.post-text", url)?;
    let content = post.html();
    let upvote_count = parse_count(
        &text(require(question_el, "span.vote-count-post", url)?),
        "span.vote-count-post",
        url,
    )?;
    let favorite_count = match first(question_el, "div.favoritecount b")? {
        Some(b) if !text(b).is_empty() => Some(parse_count(&text(b), "div.favoritecount", url)?),
        _ => None,
    };

    let (author, wiki) = match first(question_el, "td.owner")? {
        Some(owner) => {
            let details = require(owner, "div.user-details", url)?;
            (owner_author(details, url)?, false)
        }
        None => {
            let user_info = last(question_el, "div.user-info")?.ok_or_else(|| {
                ExtractError::FieldMissing {
                    field: "div.user-info",
                    url: url.to_string(),
                }
            })?;
            (wiki_author(user_info, url)?, true)
        }
    };

    let info = all(root, "#qinfo td p.label-key")?;
    let asked_time = info
        .get(1)
        .and_then(|p| p.value().attr("title"))
        .map(str::to_string)
        .ok_or_else(|| ExtractError::FieldMissing {
            field: "asked time",
            url: url.to_string(),
        })?;
    let views = match info.get(3) {
        Some(p) => first(*p, "b")?.map(text),
        None => None,
    }
    .ok_or_else(|| ExtractError::FieldMissing {
        field: "view count",
        url: url.to_string(),
    })?;
    let view_count = parse_count(views.split(' ').next().unwrap_or_default(), "view count", url)?;
    let activity_time = match info.get(5) {
        Some(p) => first(*p, "a")?.and_then(|a| a.value().attr("title").map(str::to_string)),
        None => None,
    };

    let tags = match next_element(post) {
        Some(tag_list) => all(tag_list, "a")?.into_iter().map(text).collect(),
        None => Vec::new(),
    };

    let comments = parse_comments(question_el, url)?;

    Ok(Question {
        qid,
        author,
        title,
        content,
        upvote_count,
        favorite_count,
        view_count,
        tags,
        asked_time,
        activity_time,
        wiki,
        comments,
    })
}

fn parse_answer(answer_el: ElementRef<'_>, qid: i64, url: &str) -> Result<Answer, ExtractError> {
    let aid = parse_count(&attr(answer_el, "data-answerid", url)?, "data-answerid", url)?;
    let content = require(answer_el, "div.post-text", url)?.html();
    let upvote_count = parse_count(
        &text(require(answer_el, "span.vote-count-post", url)?),
        "span.vote-count-post",
        url,
    )?;
    let accepted = first(answer_el, "span.vote-accepted-on")?.is_some();

    let user_info = last(answer_el, "div.user-info")?.ok_or_else(|| ExtractError::FieldMissing {
        field: "div.user-info",
        url: url.to_string(),
    })?;

    let (author, answered_time, wiki) = match last(user_info, "div.user-action-time")? {
        Some(action_time) => {
            let answered_time = first(action_time, "span")?
                .and_then(|span| span.value().attr("title").map(str::to_string));
            let details = last(user_info, "div.user-details")?.ok_or_else(|| {
                ExtractError::FieldMissing {
                    field: "div.user-details",
                    url: url.to_string(),
                }
            })?;
            (owner_author(details, url)?, answered_time, false)
        }
        None => (wiki_author(user_info, url)?, None, true),
    };

    let comments = parse_comments(answer_el, url)?;

    Ok(Answer {
        aid,
        qid,
        author,
        content,
        upvote_count,
        accepted,
        answered_time,
        wiki,
        comments,
    })
}

/// Parses the comment rows of one post, skipping rows that fail
fn parse_comments(post_el: ElementRef<'_>, url: &str) -> Result<Vec<Comment>, ExtractError> {
    let Some(comments_el) = first(post_el, "div.comments")? else {
        return Ok(Vec::new());
    };

    let mut comments = Vec::new();
    for row in all(comments_el, "tr.comment")? {
        match parse_comment(row, url) {
            Ok(comment) => comments.push(comment),
            Err(e) => tracing::warn!("Skipping comment on {}: {}", url, e),
        }
    }
    Ok(comments)
}

fn parse_comment(row: ElementRef<'_>, url: &str) -> Result<Comment, ExtractError> {
    let id = attr(row, "id", url)?;
    let cid = id
        .split('-')
        .nth(1)
        .and_then(|cid| cid.parse().ok())
        .ok_or_else(|| ExtractError::InvalidValue {
            field: "comment id",
            value: id.clone(),
            url: url.to_string(),
        })?;

    let body = require(row, "div.comment-body", url)?;
    let content = require(body, "span.comment-copy", url)?.html();

    let author = match first(body, "a.comment-user")? {
        Some(link) => Author::Registered(user_from_profile_link(link, url)?),
        None => Author::Anonymous(text(require(body, "span.comment-user", url)?)),
    };

    let score = match first(row, "td.comment-score span.cool")? {
        Some(span) => parse_count(&text(span), "comment score", url)?,
        None => 0,
    };

    let comment_time = attr(require(body, "span.comment-date span", url)?, "title", url)?;

    Ok(Comment {
        cid,
        author,
        content,
        score,
        comment_time,
    })
}
