//! depth-crawl: a depth-bounded, pipelined web crawler
//!
//! This crate fetches pages reachable by following hyperlinks up to a configured
//! depth and hands every fetched page to a pluggable extraction handler that turns
//! markup into structured records.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod source;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Errors that end a crawl run
///
/// Retrieval, extraction and storage failures never surface here; they are
/// contained at the task boundary and counted in the run report.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for depth {depth}: {message}")]
    InvalidSelector { depth: u32, message: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

// Re-export commonly used types
pub use crate::config::{CrawlConfig, LinkRule, SelectorPolicy};
pub use crate::crawler::{Controller, CrawlReport, CrawlTask, ParsedPage};
pub use crate::url::{canonicalize, normalize};
