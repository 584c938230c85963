//! Run counters and the completion report

use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters updated by the workers of one run
#[derive(Debug, Default)]
pub struct CrawlStats {
    tasks_discarded_depth: AtomicUsize,
    invalid_urls: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    pages_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    malformed_documents: AtomicUsize,
    pages_emitted: AtomicUsize,
    pages_extracted: AtomicUsize,
    extraction_failures: AtomicUsize,
}

/// Identifies one counter in [`CrawlStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    TasksDiscardedDepth,
    InvalidUrls,
    DuplicatesSkipped,
    PagesFetched,
    FetchFailures,
    MalformedDocuments,
    PagesEmitted,
    PagesExtracted,
    ExtractionFailures,
}

impl CrawlStats {
    /// Increments one counter
    pub fn record(&self, counter: Counter) {
        let cell = match counter {
            Counter::TasksDiscardedDepth => &self.tasks_discarded_depth,
            Counter::InvalidUrls => &self.invalid_urls,
            Counter::DuplicatesSkipped => &self.duplicates_skipped,
            Counter::PagesFetched => &self.pages_fetched,
            Counter::FetchFailures => &self.fetch_failures,
            Counter::MalformedDocuments => &self.malformed_documents,
            Counter::PagesEmitted => &self.pages_emitted,
            Counter::PagesExtracted => &self.pages_extracted,
            Counter::ExtractionFailures => &self.extraction_failures,
        };
        cell.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a report
    pub fn report(&self, visited: Vec<String>) -> CrawlReport {
        CrawlReport {
            tasks_discarded_depth: self.tasks_discarded_depth.load(Ordering::Relaxed),
            invalid_urls: self.invalid_urls.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            malformed_documents: self.malformed_documents.load(Ordering::Relaxed),
            pages_emitted: self.pages_emitted.load(Ordering::Relaxed),
            pages_extracted: self.pages_extracted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            visited,
        }
    }
}

/// Summary of a finished crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Tasks dropped because they reached the depth limit
    pub tasks_discarded_depth: usize,
    /// Tasks whose URL normalized to nothing
    pub invalid_urls: usize,
    /// Tasks dropped because their URL was already claimed
    pub duplicates_skipped: usize,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub malformed_documents: usize,
    /// Parsed pages handed to extraction
    pub pages_emitted: usize,
    pub pages_extracted: usize,
    pub extraction_failures: usize,
    /// Canonical URLs claimed during the run, sorted
    pub visited: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_reflects_counters() {
        let stats = CrawlStats::default();
        stats.record(Counter::PagesFetched);
        stats.record(Counter::PagesFetched);
        stats.record(Counter::FetchFailures);
        stats.record(Counter::PagesEmitted);

        let report = stats.report(vec!["http://example.test/".to_string()]);
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.pages_emitted, 1);
        assert_eq!(report.pages_extracted, 0);
        assert_eq!(report.visited.len(), 1);
    }
}
