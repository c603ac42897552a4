//! Crawler module for fetching pages and extracting rows
//!
//! This module contains the core scraping pipeline:
//! - HTTP fetching with failure classification
//! - Selector-based field extraction and column zipping
//! - The fixed-size worker pool
//! - Overall run coordination

mod coordinator;
mod extractor;
mod fetcher;
mod pool;

pub use coordinator::{run_scrape, Coordinator};
pub use extractor::{
    extract, extract_task_rows, Column, Columns, ExtractError, MismatchPolicy, ID_HEADER,
    URL_HEADER,
};
pub use fetcher::{build_http_client, FetchError, Page, PageFetcher};
pub use pool::{TaskError, WorkerPool, WorkerReport};
