//! Fetch stage: retrieves pages, parses them, and discovers the next frontier

use crate::crawler::context::CrawlContext;
use crate::crawler::dispatch_stage::run_handler;
use crate::crawler::document::Document;
use crate::crawler::report::Counter;
use crate::crawler::task::{CrawlTask, ParsedPage};
use crate::url::{authority, canonicalize, normalize};
use std::sync::Arc;
use url::Url;

/// Runs one fetch worker until the fetch queue is closed and drained
pub(crate) async fn run_fetch_worker(worker_id: usize, ctx: Arc<CrawlContext>) {
    tracing::debug!(worker = worker_id, "Fetch worker started");

    while let Some(task) = ctx.tasks.pop().await {
        process_task(&ctx, task).await;
        ctx.finish_item();
    }

    tracing::debug!(worker = worker_id, "Fetch worker stopped");
}

/// Processes a single task
///
/// This method:
/// 1. Discards tasks at the depth limit
/// 2. Canonicalizes the URL and claims it in the visited set
/// 3. Fetches and parses the page
/// 4. Emits the page for extraction
/// 5. Queues selected links at depth + 1 while below the limit
///
/// Every failure is logged and ends this task only.
async fn process_task(ctx: &CrawlContext, task: CrawlTask) {
    let depth_limit = ctx.config.depth_limit;

    if task.depth >= depth_limit {
        tracing::trace!("Depth limit reached for {} (depth {})", task.url, task.depth);
        ctx.stats.record(Counter::TasksDiscardedDepth);
        return;
    }

    let url = canonicalize(&task.url);
    if url.is_empty() {
        tracing::debug!("Skipping non-crawlable URL {:?}", task.url);
        ctx.stats.record(Counter::InvalidUrls);
        return;
    }

    if !ctx.visited.test_and_mark(&url) {
        tracing::trace!("Already visited {}", url);
        ctx.stats.record(Counter::DuplicatesSkipped);
        return;
    }

    tracing::debug!("Fetching {} (depth {})", url, task.depth);
    let fetched = match ctx.fetcher.fetch(&url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::warn!(url = %url, depth = task.depth, "Retrieval failed: {}", e);
            ctx.stats.record(Counter::FetchFailures);
            return;
        }
    };
    ctx.stats.record(Counter::PagesFetched);

    let document = match Document::parse(&fetched.final_url, &fetched.body) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(url = %url, depth = task.depth, "{}", e);
            ctx.stats.record(Counter::MalformedDocuments);
            return;
        }
    };

    let next_depth = task.depth + 1;
    let links = if next_depth < depth_limit {
        discover_links(ctx, task.depth, &url, &fetched.final_url, &document)
    } else {
        Vec::new()
    };

    if should_emit(task.depth, depth_limit) {
        emit(
            ctx,
            ParsedPage {
                document,
                url,
                depth: task.depth,
            },
        )
        .await;
    }

    for link in links {
        ctx.enqueue_task(CrawlTask::new(link, next_depth)).await;
    }
}

/// Whether a page at `depth` carries extractable content
///
/// Depth 0 is a link-discovery hop unless it is also the last fetchable depth.
fn should_emit(depth: u32, depth_limit: u32) -> bool {
    depth >= 1 || depth + 1 == depth_limit
}

/// Selects outbound links and normalizes them against the page's own origin
///
/// The origin is taken from the final URL after redirects, falling back to
/// the requested URL.
fn discover_links(
    ctx: &CrawlContext,
    depth: u32,
    requested_url: &str,
    final_url: &str,
    document: &Document,
) -> Vec<String> {
    let base = match Url::parse(final_url).or_else(|_| Url::parse(requested_url)) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!("Cannot resolve links on {}: {}", requested_url, e);
            return Vec::new();
        }
    };
    let scheme = base.scheme();
    let host = authority(&base);

    let links: Vec<String> = ctx
        .config
        .selector_policy
        .hrefs(depth, document.html())
        .iter()
        .map(|href| normalize(href, scheme, &host))
        .filter(|link| !link.is_empty())
        .collect();

    tracing::debug!(
        "Found {} links on {} using {}",
        links.len(),
        requested_url,
        ctx.config.selector_policy.rule_for(depth)
    );

    links
}

/// Hands a parsed page to the dispatch stage, or extracts it inline when there is none
async fn emit(ctx: &CrawlContext, page: ParsedPage) {
    ctx.stats.record(Counter::PagesEmitted);

    match (&ctx.pages, &ctx.handler) {
        (Some(queue), _) => ctx.enqueue_page(queue, page).await,
        (None, Some(handler)) => run_handler(ctx, Arc::clone(handler), page).await,
        (None, None) => tracing::trace!("No extraction handler, dropping {}", page.url),
    }
}
