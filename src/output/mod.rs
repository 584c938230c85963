//! Output module for crawl summaries
//!
//! This module handles:
//! - Loading per-kind record counts from the store
//! - Rendering the completion report of a run

pub mod stats;

pub use stats::{format_summary, load_statistics, print_summary, RecordStatistics};
