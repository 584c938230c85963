//! Registry of canonical URLs already claimed in one crawl run

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of canonical URLs claimed by a fetch worker during this run
///
/// The set only grows. Membership test and insertion happen under one lock so
/// two workers racing on the same URL can never both claim it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited
    ///
    /// Returns `true` iff the URL was newly marked, i.e. the caller owns the
    /// fetch. Returns `false` when another caller already claimed it.
    pub fn test_and_mark(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the visited URLs in sorted order
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().iter().cloned().collect();
        urls.sort();
        urls
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set is never left half-updated, so a poisoned lock is still usable
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
