//! Configuration module for iterscraper
//!
//! This module handles loading TOML configuration files, overlaying command-line
//! values, parsing the `--columns` query string and validating the result.
//!
//! # Example
//!
//! ```no_run
//! use iterscraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrape.toml")).unwrap();
//! println!("Scraping ids {}..{}", config.scrape.from, config.scrape.to);
//! ```

mod columns;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ColumnSpec, Config, HttpConfig, OutputConfig, ScrapeConfig};

pub use columns::parse_columns;
pub use parser::{load_config, parse_config, read_config};
pub use validation::validate;
