//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! merging command-line overrides, and compiling per-depth link selectors.
//!
//! # Example
//!
//! ```no_run
//! use depth_crawl::config::{load_config, Overrides};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("crawl.toml")).unwrap();
//! config.apply(&Overrides { fetch_workers: Some(8), ..Default::default() });
//! let settings = config.resolve().unwrap();
//! println!("Crawling {} seeds to depth {}", settings.seeds.len(), settings.crawl.depth_limit);
//! ```

mod parser;
mod selector;
mod settings;
mod types;
mod validation;

// Re-export types
pub use selector::{LinkRule, SelectorPolicy};
pub use settings::{build_policy, Overrides, RunSettings};
pub use types::{
    Config, CrawlConfig, CrawlerConfig, HttpConfig, SelectorEntry, SourceConfig, StorageConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
