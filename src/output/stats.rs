//! Statistics generation from the record store and the crawl report
//!
//! This module provides functionality for extracting and displaying
//! per-kind record counts alongside the counters of a finished run.

use crate::crawler::CrawlReport;
use crate::storage::{RecordKind, RecordStore, StorageResult};
use std::fmt::Write;

/// Stored record counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStatistics {
    /// Count per record kind, in [`RecordKind::ALL`] order
    pub counts: Vec<(RecordKind, u64)>,
}

impl RecordStatistics {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn count(&self, kind: RecordKind) -> u64 {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The record store to query
///
/// # Returns
///
/// * `Ok(RecordStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(store: &dyn RecordStore) -> StorageResult<RecordStatistics> {
    let counts = RecordKind::ALL
        .iter()
        .map(|kind| store.count(*kind).map(|count| (*kind, count)))
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(RecordStatistics { counts })
}

/// Renders the run summary
///
/// `before` holds the record counts taken before the run, so the summary can
/// show how many records the run added.
pub fn format_summary(
    report: &CrawlReport,
    before: Option<&RecordStatistics>,
    after: Option<&RecordStatistics>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Visited: {}", report.visited.len());
    let _ = writeln!(out, "  Fetched: {}", report.pages_fetched);
    let _ = writeln!(out, "  Retrieval failures: {}", report.fetch_failures);
    let _ = writeln!(out, "  Malformed documents: {}", report.malformed_documents);
    let _ = writeln!(out, "  Duplicates skipped: {}", report.duplicates_skipped);
    let _ = writeln!(out, "  Invalid URLs: {}", report.invalid_urls);
    let _ = writeln!(out, "  Emitted for extraction: {}", report.pages_emitted);
    let _ = writeln!(out, "  Extracted: {}", report.pages_extracted);
    let _ = writeln!(out, "  Extraction failures: {}", report.extraction_failures);

    if let Some(after) = after {
        let _ = writeln!(out, "\nRecords:");
        for (kind, count) in &after.counts {
            let added = before.map(|b| count.saturating_sub(b.count(*kind)));
            match added {
                Some(added) => {
                    let _ = writeln!(out, "  {}s: {} (+{})", kind, count, added);
                }
                None => {
                    let _ = writeln!(out, "  {}s: {}", kind, count);
                }
            }
        }
    }

    out
}

/// Prints the run summary to stdout
pub fn print_summary(
    report: &CrawlReport,
    before: Option<&RecordStatistics>,
    after: Option<&RecordStatistics>,
) {
    print!("{}", format_summary(report, before, after));
}
