//! Crawl controller - orchestrates one pipelined crawl run
//!
//! The controller:
//! - Validates the engine configuration and seed URLs
//! - Seeds the fetch queue at depth 0
//! - Starts the fetch and dispatch worker pools
//! - Waits until no work is queued or in flight
//! - Returns the completion report

use crate::config::CrawlConfig;
use crate::crawler::context::CrawlContext;
use crate::crawler::dispatch_stage::run_dispatch_worker;
use crate::crawler::fetch_stage::run_fetch_worker;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::report::CrawlReport;
use crate::crawler::task::CrawlTask;
use crate::extract::PageHandler;
use crate::url::canonicalize;
use crate::{ConfigError, CrawlError};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Runs depth-bounded crawls with a fixed configuration
pub struct Controller {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    handler: Option<Arc<dyn PageHandler>>,
}

impl Controller {
    /// Creates a controller without an extraction handler
    ///
    /// Pages are still fetched and counted as emitted, but nothing consumes them.
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            fetcher,
            handler: None,
        }
    }

    /// Sets the handler invoked once per emitted page
    pub fn with_handler(mut self, handler: Arc<dyn PageHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls from `seeds` until all reachable work within the depth limit is done
    ///
    /// # Arguments
    ///
    /// * `seeds` - Absolute http(s) URLs, each enqueued at depth 0
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run drained completely
    /// * `Err(CrawlError)` - Invalid configuration or seeds, or a worker panicked
    pub async fn run(&self, seeds: &[String]) -> Result<CrawlReport, CrawlError> {
        self.validate(seeds)?;

        tracing::info!(
            "Starting crawl: {} seeds, depth limit {}, {} fetch workers, {} dispatch workers",
            seeds.len(),
            self.config.depth_limit,
            self.config.fetch_worker_count,
            self.dispatch_worker_count()
        );
        let started = Instant::now();

        let ctx = Arc::new(CrawlContext::new(
            self.config.clone(),
            Arc::clone(&self.fetcher),
            self.handler.clone(),
        ));

        for seed in seeds {
            ctx.enqueue_task(CrawlTask::seed(seed.as_str())).await;
        }
        if ctx.in_flight.is_idle() {
            ctx.shutdown();
        }

        let mut workers = JoinSet::new();
        for id in 0..self.config.fetch_worker_count {
            workers.spawn(run_fetch_worker(id, Arc::clone(&ctx)));
        }
        if ctx.pages.is_some() {
            for id in 0..self.config.dispatch_worker_count {
                workers.spawn(run_dispatch_worker(id, Arc::clone(&ctx)));
            }
        }

        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
                // Surviving workers may be parked on queues the dead one would have closed
                ctx.shutdown();
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            return Err(CrawlError::Worker(e));
        }

        let report = ctx.report();
        tracing::info!(
            "Crawl complete in {:.2?}: {} fetched, {} failed, {} emitted, {} extracted",
            started.elapsed(),
            report.pages_fetched,
            report.fetch_failures,
            report.pages_emitted,
            report.pages_extracted
        );

        Ok(report)
    }

    /// Dispatch workers only run when there is a handler to feed
    fn dispatch_worker_count(&self) -> usize {
        if self.handler.is_some() {
            self.config.dispatch_worker_count
        } else {
            0
        }
    }

    fn validate(&self, seeds: &[String]) -> Result<(), ConfigError> {
        if self.config.depth_limit < 1 {
            return Err(ConfigError::Validation(
                "depth limit must be at least 1".to_string(),
            ));
        }
        if self.config.fetch_worker_count < 1 {
            return Err(ConfigError::Validation(
                "fetch worker count must be at least 1".to_string(),
            ));
        }
        if self.config.dispatch_worker_count > 0 && self.config.output_queue_capacity < 1 {
            return Err(ConfigError::Validation(
                "output queue capacity must be at least 1".to_string(),
            ));
        }

        for seed in seeds {
            if canonicalize(seed).is_empty() {
                return Err(ConfigError::InvalidUrl(seed.clone()));
            }
        }

        Ok(())
    }
}
