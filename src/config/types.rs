use crate::config::selector::SelectorPolicy;
use crate::extract::Profile;
use serde::Deserialize;

/// Main configuration structure, as read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of link hops after which tasks are discarded; profile default when unset
    #[serde(rename = "depth-limit")]
    pub depth_limit: Option<u32>,

    /// Number of fetch workers
    #[serde(rename = "fetch-workers", default = "default_fetch_workers")]
    pub fetch_workers: usize,

    /// Number of dispatch workers; 0 runs extraction inline in the fetch workers
    #[serde(rename = "dispatch-workers", default = "default_dispatch_workers")]
    pub dispatch_workers: usize,

    /// Maximum parsed pages waiting for extraction
    #[serde(
        rename = "output-queue-capacity",
        default = "default_output_queue_capacity"
    )]
    pub output_queue_capacity: usize,

    /// Link selection rules per depth; profile defaults when empty
    #[serde(default)]
    pub selectors: Vec<SelectorEntry>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            depth_limit: None,
            fetch_workers: default_fetch_workers(),
            dispatch_workers: default_dispatch_workers(),
            output_queue_capacity: default_output_queue_capacity(),
            selectors: Vec::new(),
        }
    }
}

/// One `[[crawler.selectors]]` entry; exactly one of `class`, `css` or `all` is set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorEntry {
    pub depth: u32,
    pub class: Option<String>,
    pub css: Option<String>,
    #[serde(default)]
    pub all: bool,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,

    /// Redirect hops to follow; 0 disables redirects
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Where the seed URLs come from and which extraction profile runs
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Listing URL; `{page}` is replaced by every page number in the range
    #[serde(rename = "url-template")]
    pub url_template: Option<String>,

    #[serde(rename = "start-page", default = "default_page")]
    pub start_page: u32,

    #[serde(rename = "end-page", default = "default_page")]
    pub end_page: u32,

    #[serde(default)]
    pub profile: Profile,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: None,
            start_page: default_page(),
            end_page: default_page(),
            profile: Profile::default(),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

/// Immutable engine configuration for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Tasks at this depth are discarded without fetching
    pub depth_limit: u32,

    pub selector_policy: SelectorPolicy,

    pub fetch_worker_count: usize,

    /// 0 means extraction runs inline in the fetch workers
    pub dispatch_worker_count: usize,

    pub output_queue_capacity: usize,
}

impl CrawlConfig {
    /// Creates a configuration with the "all anchors" policy at every depth
    pub fn new(depth_limit: u32) -> Self {
        Self {
            depth_limit,
            selector_policy: SelectorPolicy::new(),
            fetch_worker_count: default_fetch_workers(),
            dispatch_worker_count: default_dispatch_workers(),
            output_queue_capacity: default_output_queue_capacity(),
        }
    }

    pub fn with_policy(mut self, policy: SelectorPolicy) -> Self {
        self.selector_policy = policy;
        self
    }

    pub fn with_workers(mut self, fetch: usize, dispatch: usize) -> Self {
        self.fetch_worker_count = fetch;
        self.dispatch_worker_count = dispatch;
        self
    }

    pub fn with_output_queue_capacity(mut self, capacity: usize) -> Self {
        self.output_queue_capacity = capacity;
        self
    }
}

fn default_fetch_workers() -> usize {
    4
}

fn default_dispatch_workers() -> usize {
    2
}

fn default_output_queue_capacity() -> usize {
    64
}

fn default_user_agent() -> String {
    format!("depth-crawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_page() -> u32 {
    1
}
