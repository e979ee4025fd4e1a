use crate::config::types::{
    Config, CrawlerConfig, DocumentConfig, HttpConfig, PageConfig, RelevanceConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_page_config(&config.page)?;
    validate_document_config(&config.documents)?;
    validate_relevance_config(&config.relevance)?;

    if config.output.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page_limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if config.document_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "document_limit must be >= 1, got {}",
            config.document_limit
        )));
    }

    if let Some(scope) = &config.path_must_contain {
        if scope.trim().is_empty() {
            return Err(ConfigError::Validation(
                "path_must_contain cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates timeouts and retry settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("page_timeout_ms", config.page_timeout_ms),
        ("document_timeout_ms", config.document_timeout_ms),
        ("connect_timeout_ms", config.connect_timeout_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates that every content selector parses
fn validate_page_config(config: &PageConfig) -> Result<(), ConfigError> {
    for selector in &config.content_selectors {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid content selector '{}'",
                selector
            )));
        }
    }
    Ok(())
}

/// Validates document settings
fn validate_document_config(config: &DocumentConfig) -> Result<(), ConfigError> {
    if config.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "documents.extensions must list at least one extension".to_string(),
        ));
    }

    if config.extensions.iter().any(|ext| ext.starts_with('.')) {
        return Err(ConfigError::Validation(
            "documents.extensions must not include the leading dot".to_string(),
        ));
    }

    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "documents.concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if config.page_cap < 1 {
        return Err(ConfigError::Validation(
            "documents.page_cap must be >= 1".to_string(),
        ));
    }

    if config.extraction_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "documents.extraction_timeout_ms must be > 0".to_string(),
        ));
    }

    if let Some(repo) = &config.repository {
        if !repo.path_prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "repository path_prefix must start with '/', got '{}'",
                repo.path_prefix
            )));
        }
        Url::parse(&repo.repository_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid repository_url '{}': {}",
                repo.repository_url, e
            ))
        })?;
        if repo.query_param.is_empty() {
            return Err(ConfigError::Validation(
                "repository query_param cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates relevance terms
fn validate_relevance_config(config: &RelevanceConfig) -> Result<(), ConfigError> {
    if config
        .keywords
        .iter()
        .chain(config.reject_markers.iter())
        .any(|term| term.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "relevance terms cannot be blank".to_string(),
        ));
    }

    for rule in &config.compound {
        if rule.anchor.trim().is_empty() || rule.any_of.is_empty() {
            return Err(ConfigError::Validation(format!(
                "compound rule '{}' needs an anchor and at least one term",
                rule.anchor
            )));
        }
    }

    Ok(())
}
