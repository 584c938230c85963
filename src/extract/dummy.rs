use crate::crawler::ParsedPage;
use crate::extract::{ExtractError, PageHandler};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Logs each page's title and stores nothing
#[derive(Debug, Default)]
pub struct DummyHandler {
    handled: AtomicUsize,
}

impl DummyHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages seen so far
    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::Relaxed)
    }
}

impl PageHandler for DummyHandler {
    fn handle(&self, page: &ParsedPage) -> Result<(), ExtractError> {
        let title = page.document.title().unwrap_or_default();
        tracing::info!("[depth {}] {} {:?}", page.depth, page.url, title);
        self.handled.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
