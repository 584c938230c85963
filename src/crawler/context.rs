//! State shared by every worker of one crawl run

use crate::config::CrawlConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::queue::WorkQueue;
use crate::crawler::report::{CrawlReport, CrawlStats};
use crate::crawler::task::{CrawlTask, ParsedPage};
use crate::crawler::tracker::InFlight;
use crate::crawler::visited::VisitedSet;
use crate::extract::PageHandler;
use std::sync::Arc;

/// Everything the two worker pools share for the lifetime of a run
pub(crate) struct CrawlContext {
    pub config: CrawlConfig,
    pub visited: VisitedSet,
    pub tasks: WorkQueue<CrawlTask>,
    /// Present only when a dispatch stage runs
    pub pages: Option<WorkQueue<ParsedPage>>,
    pub in_flight: InFlight,
    pub stats: CrawlStats,
    pub fetcher: Arc<dyn Fetcher>,
    pub handler: Option<Arc<dyn PageHandler>>,
}

impl CrawlContext {
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        handler: Option<Arc<dyn PageHandler>>,
    ) -> Self {
        let pages = match &handler {
            Some(_) if config.dispatch_worker_count > 0 => {
                Some(WorkQueue::bounded(config.output_queue_capacity))
            }
            _ => None,
        };

        Self {
            config,
            visited: VisitedSet::new(),
            tasks: WorkQueue::unbounded(),
            pages,
            in_flight: InFlight::new(),
            stats: CrawlStats::default(),
            fetcher,
            handler,
        }
    }

    /// Queues a fetch task, counting it as in flight before it becomes visible
    pub async fn enqueue_task(&self, task: CrawlTask) {
        self.in_flight.add();
        if let Err(rejected) = self.tasks.push(task).await {
            tracing::warn!("Fetch queue closed, dropping task {}", rejected.0.url);
            self.finish_item();
        }
    }

    /// Queues a parsed page for the dispatch stage
    pub async fn enqueue_page(&self, queue: &WorkQueue<ParsedPage>, page: ParsedPage) {
        self.in_flight.add();
        if let Err(rejected) = queue.push(page).await {
            tracing::warn!("Output queue closed, dropping page {}", rejected.0.url);
            self.finish_item();
        }
    }

    /// Marks one queued item as fully processed; the last one closes both queues
    pub fn finish_item(&self) {
        if self.in_flight.finish() {
            self.shutdown();
        }
    }

    /// Closes both queues so idle workers exit
    pub fn shutdown(&self) {
        tracing::debug!("No work in flight, closing queues");
        self.tasks.close();
        if let Some(pages) = &self.pages {
            pages.close();
        }
    }

    pub fn report(&self) -> CrawlReport {
        self.stats.report(self.visited.snapshot())
    }
}
