//! Merging of file configuration and command-line overrides into run settings

use crate::config::selector::{LinkRule, SelectorPolicy};
use crate::config::types::{Config, CrawlConfig, HttpConfig, SelectorEntry};
use crate::config::validation::validate;
use crate::extract::Profile;
use crate::source::seed_urls;
use crate::url::canonicalize;
use crate::ConfigError;
use std::path::PathBuf;

/// Values given on the command line; each one replaces the file value when set
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub fetch_workers: Option<usize>,
    pub dispatch_workers: Option<usize>,
    pub depth_limit: Option<u32>,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub database_path: Option<String>,
    pub url_template: Option<String>,
    pub profile: Option<Profile>,
}

/// Fully resolved settings for one crawl run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub crawl: CrawlConfig,
    pub http: HttpConfig,
    pub seeds: Vec<String>,
    pub database_path: PathBuf,
    pub profile: Profile,
}

impl Config {
    /// Applies command-line overrides on top of the file values
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(workers) = overrides.fetch_workers {
            self.crawler.fetch_workers = workers;
        }
        if let Some(workers) = overrides.dispatch_workers {
            self.crawler.dispatch_workers = workers;
        }
        if let Some(depth) = overrides.depth_limit {
            self.crawler.depth_limit = Some(depth);
        }
        if let Some(start) = overrides.start_page {
            self.source.start_page = start;
        }
        if let Some(end) = overrides.end_page {
            self.source.end_page = end;
        }
        if let Some(path) = &overrides.database_path {
            self.storage.database_path = Some(path.clone());
        }
        if let Some(template) = &overrides.url_template {
            self.source.url_template = Some(template.clone());
        }
        if let Some(profile) = overrides.profile {
            self.source.profile = profile;
        }
    }

    /// Validates the merged configuration and builds the run settings
    ///
    /// Fails before any worker starts when the template or database path is
    /// missing, a count is out of range, a selector does not compile, or a
    /// seed is not an absolute http(s) URL.
    pub fn resolve(&self) -> Result<RunSettings, ConfigError> {
        validate(self)?;

        let template = self
            .source
            .url_template
            .as_deref()
            .ok_or(ConfigError::Missing("url template"))?;
        let database_path = self
            .storage
            .database_path
            .as_deref()
            .ok_or(ConfigError::Missing("database path"))?;

        let profile = self.source.profile;
        let seeds = seed_urls(template, self.source.start_page, self.source.end_page);
        for seed in &seeds {
            if canonicalize(seed).is_empty() {
                return Err(ConfigError::InvalidUrl(format!(
                    "seed '{}' is not an absolute http(s) URL",
                    seed
                )));
            }
        }

        let selector_policy = if self.crawler.selectors.is_empty() {
            profile.default_policy()?
        } else {
            build_policy(&self.crawler.selectors)?
        };

        let crawl = CrawlConfig::new(
            self.crawler
                .depth_limit
                .unwrap_or_else(|| profile.default_depth_limit()),
        )
        .with_policy(selector_policy)
        .with_workers(self.crawler.fetch_workers, self.crawler.dispatch_workers)
        .with_output_queue_capacity(self.crawler.output_queue_capacity);

        Ok(RunSettings {
            crawl,
            http: self.http.clone(),
            seeds,
            database_path: PathBuf::from(database_path),
            profile,
        })
    }
}

/// Compiles `[[crawler.selectors]]` entries into a policy
pub fn build_policy(entries: &[SelectorEntry]) -> Result<SelectorPolicy, ConfigError> {
    let mut policy = SelectorPolicy::new();
    for entry in entries {
        let rule = match (&entry.class, &entry.css, entry.all) {
            (Some(class), None, false) => LinkRule::Class(class.clone()),
            (None, Some(css), false) => LinkRule::Css(css.clone()),
            (None, None, true) => LinkRule::All,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "selector for depth {} must set exactly one of class, css or all",
                    entry.depth
                )))
            }
        };
        policy.insert(entry.depth, rule)?;
    }
    Ok(policy)
}
