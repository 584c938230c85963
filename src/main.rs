//! depth-crawl main entry point
//!
//! Command-line interface: crawls listing pages built from a URL template and
//! stores the extracted records in SQLite.

use anyhow::Context;
use clap::Parser;
use depth_crawl::config::{load_config_with_hash, Config, Overrides, RunSettings};
use depth_crawl::crawler::{Controller, HttpFetcher};
use depth_crawl::extract::{build_handler, Profile};
use depth_crawl::output::{load_statistics, print_summary};
use depth_crawl::storage::{open_store, StorageError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// depth-crawl: a depth-bounded, pipelined web crawler
///
/// Seeds are built by substituting every page number from --start to --end
/// into the URL template's `{page}` placeholder. Command-line values override
/// the configuration file.
#[derive(Parser, Debug)]
#[command(name = "depth-crawl")]
#[command(version)]
#[command(about = "A depth-bounded, pipelined web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of fetch workers
    #[arg(short = 'n', long, value_name = "N")]
    threads: Option<usize>,

    /// Number of dispatch workers (0 extracts inline in the fetch workers)
    #[arg(long, value_name = "N")]
    dispatch_workers: Option<usize>,

    /// Depth limit (link hops from the seed pages)
    #[arg(short, long)]
    depth: Option<u32>,

    /// First listing page number
    #[arg(short, long)]
    start: Option<u32>,

    /// Last listing page number
    #[arg(short, long)]
    end: Option<u32>,

    /// SQLite database file for extracted records
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Listing URL template, e.g. "https://example.com/questions?page={page}"
    #[arg(short, long)]
    template: Option<String>,

    /// Extraction profile
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            fetch_workers: self.threads,
            dispatch_workers: self.dispatch_workers,
            depth_limit: self.depth,
            start_page: self.start,
            end_page: self.end,
            database_path: self.database.clone(),
            url_template: self.template.clone(),
            profile: self.profile,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    config.apply(&cli.overrides());

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    handle_crawl(settings).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depth_crawl=info,warn"),
            1 => EnvFilter::new("depth_crawl=debug,info"),
            2 => EnvFilter::new("depth_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the main crawl operation
async fn handle_crawl(settings: RunSettings) -> anyhow::Result<()> {
    tracing::info!(
        "Profile: {}, seeds: {}, database: {}",
        settings.profile.name(),
        settings.seeds.len(),
        settings.database_path.display()
    );

    let store = match open_store(&settings.database_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(
                "Cannot open database {}: {}",
                settings.database_path.display(),
                e
            );
            return Err(e.into());
        }
    };

    let before = {
        let guard = store.lock().map_err(|_| StorageError::Poisoned)?;
        load_statistics(&*guard)?
    };

    let fetcher = HttpFetcher::new(&settings.http).context("failed to build HTTP client")?;
    let handler = build_handler(settings.profile, Arc::clone(&store));
    let controller = Controller::new(settings.crawl, Arc::new(fetcher)).with_handler(handler);

    let report = match controller.run(&settings.seeds).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let after = {
        let guard = store.lock().map_err(|_| StorageError::Poisoned)?;
        load_statistics(&*guard)?
    };
    print_summary(&report, Some(&before), Some(&after));

    Ok(())
}
