//! iterscraper: scrape pages whose URLs contain an incrementing integer
//!
//! This crate enumerates a range of identifiers, substitutes each into a URL
//! template, fetches the pages concurrently, extracts fields with CSS selectors
//! and writes every extracted row to a single CSV file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod task;

use thiserror::Error;

/// Main error type for iterscraper runs
///
/// Only configuration, output and worker-panic failures surface here. Per-page
/// failures are handled inside the worker pool and never abort a run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
///
/// All of these are raised before the first request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid columns: {0}")]
    InvalidColumns(String),

    #[error("Duplicate column header: {0}")]
    DuplicateHeader(String),

    #[error("Invalid selector '{selector}' for column '{header}': {message}")]
    InvalidSelector {
        header: String,
        selector: String,
        message: String,
    },
}

/// Result type alias for iterscraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A single output record: `url`, `id`, then one cell per column
pub type Row = Vec<String>;

// Re-export commonly used types
pub use config::{ColumnSpec, Config};
pub use crawler::{run_scrape, MismatchPolicy};
pub use output::RunSummary;
pub use state::WorkerState;
pub use task::{Task, TaskSource, UrlTemplate};
