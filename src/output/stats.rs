//! Run statistics
//!
//! This module collects what a scrape run did and prints it in a readable form.

use std::time::Duration;

/// Summary of a finished scrape run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks in the configured id range
    pub tasks_total: u64,

    /// Tasks whose page was fetched and extracted
    pub tasks_succeeded: u64,

    /// Tasks dropped because the fetch or extraction failed
    ///
    /// Includes rate-limited tasks.
    pub tasks_failed: u64,

    /// Tasks dropped because the server answered HTTP 429
    pub tasks_rate_limited: u64,

    /// Data rows written to the output (header excluded)
    pub rows_written: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Tasks that were picked up by a worker
    pub fn tasks_processed(&self) -> u64 {
        self.tasks_succeeded + self.tasks_failed
    }

    /// Processed pages per second
    pub fn pages_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.tasks_processed() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary, output_path: &str) {
    println!("=== Scrape Summary ===\n");
    println!("Output: {}", output_path);
    println!();
    println!("Tasks:");
    println!("  In range:     {}", summary.tasks_total);
    println!("  Succeeded:    {}", summary.tasks_succeeded);
    println!("  Failed:       {}", summary.tasks_failed);
    if summary.tasks_rate_limited > 0 {
        println!(
            "  Rate limited: {} (consider lowering --concurrency)",
            summary.tasks_rate_limited
        );
    }
    println!();
    println!("Rows written: {}", summary.rows_written);
    println!(
        "Elapsed: {:.2}s ({:.2} pages/sec)",
        summary.elapsed.as_secs_f64(),
        summary.pages_per_sec()
    );
}
