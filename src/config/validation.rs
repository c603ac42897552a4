use crate::config::types::{ColumnSpec, Config, HttpConfig, OutputConfig, ScrapeConfig};
use crate::crawler::Columns;
use crate::task::UrlTemplate;
use crate::ConfigError;
use std::collections::HashSet;

/// Header names always occupied by the first two output columns
pub const RESERVED_HEADERS: [&str; 2] = ["url", "id"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scrape_config(&config.scrape)?;
    validate_output_config(&config.output)?;
    validate_http_config(&config.http)?;
    validate_columns(&config.columns)?;
    Ok(())
}

/// Validates the template, range and concurrency settings
fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    UrlTemplate::parse(&config.url_template)?;

    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.from >= config.to {
        tracing::warn!(
            "Id range [{}, {}) is empty, no pages will be fetched",
            config.from,
            config.to
        );
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates the column list and compiles every selector once
fn validate_columns(columns: &[ColumnSpec]) -> Result<(), ConfigError> {
    if columns.is_empty() {
        return Err(ConfigError::Validation(
            "at least one column is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for column in columns {
        if column.header.is_empty() {
            return Err(ConfigError::Validation(format!(
                "column header cannot be empty (selector '{}')",
                column.selector
            )));
        }

        if RESERVED_HEADERS.contains(&column.header.as_str()) {
            return Err(ConfigError::Validation(format!(
                "column header '{}' is reserved",
                column.header
            )));
        }

        if column.selector.is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector for column '{}' cannot be empty",
                column.header
            )));
        }

        if !seen.insert(column.header.as_str()) {
            return Err(ConfigError::DuplicateHeader(column.header.clone()));
        }
    }

    Columns::compile(columns)?;

    Ok(())
}
