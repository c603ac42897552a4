use crate::crawler::MismatchPolicy;
use serde::Deserialize;

/// Main configuration structure for iterscraper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default, rename = "column")]
    pub columns: Vec<ColumnSpec>,
}

/// Which pages to scrape and how many at once
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// URL containing a single `%d` where the id is substituted
    #[serde(rename = "url-template")]
    pub url_template: String,

    /// First id to scrape (inclusive)
    pub from: i64,

    /// Last id to scrape (exclusive)
    pub to: i64,

    /// Number of pages fetched in parallel
    pub concurrency: usize,

    /// How to zip columns whose match counts differ
    pub mismatch: MismatchPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: "http://example.com/v/%d".to_string(),
            from: 0,
            to: 1,
            concurrency: 1,
            mismatch: MismatchPolicy::default(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the CSV file to create
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "output.csv".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// One output column: a header and the CSS selector that fills it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSpec {
    pub header: String,
    pub selector: String,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            selector: selector.into(),
        }
    }
}
