use crate::config::types::{Config, CrawlerConfig, HttpConfig, SelectorEntry, SourceConfig};
use crate::ConfigError;

/// Upper bound on either worker pool
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
///
/// Settings that may still come from the command line (template, database path)
/// are only checked when present; [`crate::config::Config::resolve`] reports them
/// as missing.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_source_config(&config.source)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if let Some(depth_limit) = config.depth_limit {
        if depth_limit < 1 {
            return Err(ConfigError::Validation(format!(
                "depth_limit must be >= 1, got {}",
                depth_limit
            )));
        }
    }

    if config.fetch_workers < 1 || config.fetch_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "fetch_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.fetch_workers
        )));
    }

    if config.dispatch_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "dispatch_workers must be at most {}, got {}",
            MAX_WORKERS, config.dispatch_workers
        )));
    }

    if config.output_queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "output_queue_capacity must be >= 1".to_string(),
        ));
    }

    for entry in &config.selectors {
        validate_selector_entry(entry)?;
    }

    Ok(())
}

/// Validates that a selector entry names exactly one rule
fn validate_selector_entry(entry: &SelectorEntry) -> Result<(), ConfigError> {
    let set = [entry.class.is_some(), entry.css.is_some(), entry.all]
        .iter()
        .filter(|set| **set)
        .count();

    if set != 1 {
        return Err(ConfigError::Validation(format!(
            "selector for depth {} must set exactly one of class, css or all",
            entry.depth
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seed source
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.start_page > config.end_page {
        return Err(ConfigError::Validation(format!(
            "start_page ({}) must not exceed end_page ({})",
            config.start_page, config.end_page
        )));
    }

    if let Some(template) = &config.url_template {
        if template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "url_template cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.source.url_template = Some("http://example.test/questions?page={page}".to_string());
        config
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut config = valid_config();
        config.crawler.depth_limit = Some(0);
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_fetch_workers_rejected() {
        let mut config = valid_config();
        config.crawler.fetch_workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_dispatch_workers_allowed() {
        let mut config = valid_config();
        config.crawler.dispatch_workers = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_too_many_workers_rejected() {
        let mut config = valid_config();
        config.crawler.fetch_workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_selector_with_two_rules_rejected() {
        let mut config = valid_config();
        config.crawler.selectors.push(SelectorEntry {
            depth: 0,
            class: Some("item".to_string()),
            css: Some("a".to_string()),
            all: false,
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_selector_with_no_rule_rejected() {
        let mut config = valid_config();
        config.crawler.selectors.push(SelectorEntry {
            depth: 0,
            ..Default::default()
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_page_range_rejected() {
        let mut config = valid_config();
        config.source.start_page = 5;
        config.source.end_page = 2;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_template_rejected() {
        let mut config = valid_config();
        config.source.url_template = Some("  ".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = valid_config();
        config.http.user_agent = String::new();
        assert!(validate(&config).is_err());
    }
}
