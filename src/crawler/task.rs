use crate::crawler::document::Document;

/// A URL waiting to be fetched, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, 0)
    }
}

/// A fetched and parsed page awaiting extraction
#[derive(Debug)]
pub struct ParsedPage {
    pub document: Document,
    /// Canonical URL the page was fetched under
    pub url: String,
    pub depth: u32,
}
