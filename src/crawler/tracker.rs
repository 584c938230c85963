//! In-flight work accounting used to detect crawl completion

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts queued-or-processing work items across both pipeline stages
///
/// Every enqueue calls [`InFlight::add`] before the item becomes visible to a
/// consumer; every consumer calls [`InFlight::finish`] only after the item's
/// follow-up work has itself been added. The count therefore reaches zero
/// exactly once, when no queued item remains and no worker can produce more.
#[derive(Debug, Default)]
pub struct InFlight {
    count: AtomicUsize,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one new work item
    pub fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one work item as finished
    ///
    /// Returns `true` when this call brought the count to zero.
    pub fn finish(&self) -> bool {
        let previous = self.count.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "InFlight::finish called more often than add");
        previous == 1
    }

    pub fn is_idle(&self) -> bool {
        self.count.load(Ordering::SeqCst) == 0
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
