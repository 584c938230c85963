//! Concurrent crawl engine
//!
//! This module contains the core crawling logic, including:
//! - HTTP retrieval behind the [`Fetcher`] capability
//! - The atomic visited set and the two work queues
//! - The fetch stage (retrieve, parse, discover links)
//! - The dispatch stage (run the extraction handler)
//! - The [`Controller`] that seeds a run and detects its completion

mod context;
mod coordinator;
mod dispatch_stage;
mod document;
mod fetch_stage;
mod fetcher;
mod queue;
mod report;
mod task;
mod tracker;
mod visited;

pub use coordinator::Controller;
pub use document::{Document, MalformedDocument};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use queue::{QueueClosed, WorkQueue};
pub use report::{Counter, CrawlReport, CrawlStats};
pub use task::{CrawlTask, ParsedPage};
pub use tracker::InFlight;
pub use visited::VisitedSet;
