//! Extraction handlers
//!
//! A handler is invoked once per emitted page with its parsed document,
//! canonical URL and depth. Handlers are selected once per run by profile:
//! - `stackexchange`: stores questions, answers, comments and users
//! - `dummy`: logs page titles and stores nothing

mod dummy;
mod html;
mod stackexchange;

pub use dummy::DummyHandler;
pub use stackexchange::StackExchangeHandler;

use crate::config::{LinkRule, SelectorPolicy};
use crate::crawler::ParsedPage;
use crate::storage::{SharedStore, StorageError};
use crate::ConfigError;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Failure to turn one page into records
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing {element} in {url}")]
    StructureMissing { element: &'static str, url: String },

    #[error("Missing field '{field}' in {url}")]
    FieldMissing { field: &'static str, url: String },

    #[error("Invalid value for '{field}' in {url}: {value:?}")]
    InvalidValue {
        field: &'static str,
        value: String,
        url: String,
    },

    #[error("Invalid selector '{css}': {message}")]
    Selector { css: &'static str, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Pluggable per-page extraction logic
///
/// Implementations must tolerate concurrent calls from several dispatch
/// workers. Missing optional fields are not errors; only structurally
/// invalid documents are.
pub trait PageHandler: Send + Sync {
    fn handle(&self, page: &ParsedPage) -> Result<(), ExtractError>;
}

/// Named extraction profile selected on the command line or in config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    #[value(name = "stackexchange")]
    StackExchange,
    Dummy,
}

impl Profile {
    /// Depth limit used when none is configured
    pub fn default_depth_limit(&self) -> u32 {
        match self {
            // listing -> question -> answer pages
            Self::StackExchange => 3,
            Self::Dummy => 2,
        }
    }

    /// Link policy used when no selectors are configured
    pub fn default_policy(&self) -> Result<SelectorPolicy, ConfigError> {
        match self {
            Self::StackExchange => SelectorPolicy::new()
                .with_rule(0, LinkRule::Css(stackexchange::QUESTION_LINKS.to_string()))?
                .with_rule(1, LinkRule::Css(stackexchange::ANSWER_PAGES.to_string())),
            Self::Dummy => Ok(SelectorPolicy::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StackExchange => "stackexchange",
            Self::Dummy => "dummy",
        }
    }
}

/// Builds the handler for a profile
pub fn build_handler(profile: Profile, store: SharedStore) -> Arc<dyn PageHandler> {
    match profile {
        Profile::StackExchange => Arc::new(StackExchangeHandler::new(store)),
        Profile::Dummy => Arc::new(DummyHandler::new()),
    }
}
