//! Dispatch stage: runs the extraction handler on parsed pages

use crate::crawler::context::CrawlContext;
use crate::crawler::report::Counter;
use crate::crawler::task::ParsedPage;
use crate::extract::PageHandler;
use std::sync::Arc;

/// Runs one dispatch worker until the output queue is closed and drained
pub(crate) async fn run_dispatch_worker(worker_id: usize, ctx: Arc<CrawlContext>) {
    let (Some(queue), Some(handler)) = (ctx.pages.as_ref(), ctx.handler.as_ref()) else {
        return;
    };

    tracing::debug!(worker = worker_id, "Dispatch worker started");

    while let Some(page) = queue.pop().await {
        run_handler(&ctx, Arc::clone(handler), page).await;
        ctx.finish_item();
    }

    tracing::debug!(worker = worker_id, "Dispatch worker stopped");
}

/// Invokes the handler on the blocking pool and contains any failure
///
/// Handlers talk to synchronous persistence, so they never run on an async
/// worker thread. Errors and panics are logged and counted, never propagated.
pub(crate) async fn run_handler(
    ctx: &CrawlContext,
    handler: Arc<dyn PageHandler>,
    page: ParsedPage,
) {
    let url = page.url.clone();
    let depth = page.depth;

    match tokio::task::spawn_blocking(move || handler.handle(&page)).await {
        Ok(Ok(())) => {
            tracing::trace!("Extracted {} (depth {})", url, depth);
            ctx.stats.record(Counter::PagesExtracted);
        }
        Ok(Err(e)) => {
            tracing::warn!(url = %url, depth = depth, "Extraction failed: {}", e);
            ctx.stats.record(Counter::ExtractionFailures);
        }
        Err(e) => {
            tracing::error!(url = %url, depth = depth, "Extraction handler panicked: {}", e);
            ctx.stats.record(Counter::ExtractionFailures);
        }
    }
}
