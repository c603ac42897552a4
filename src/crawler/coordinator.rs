//! Scrape coordinator - wires the pipeline together
//!
//! ```text
//! TaskSource ──tasks──▶ WorkerPool (N workers) ──rows──▶ RowSink ──▶ CSV file
//! ```
//!
//! The producer and the pool run on the async runtime; the sink runs on a
//! blocking thread because it does synchronous file I/O.

use crate::config::{validate, Config};
use crate::crawler::extractor::Columns;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pool::WorkerPool;
use crate::output::{RowSink, RunSummary};
use crate::task::{Task, TaskSource, UrlTemplate};
use crate::{Row, ScrapeError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Rows buffered between the workers and the sink
const ROW_BUFFER: usize = 256;

/// Validated, compiled state for one scrape run
pub struct Coordinator {
    config: Config,
    template: UrlTemplate,
    columns: Arc<Columns>,
    fetcher: PageFetcher,
}

impl Coordinator {
    /// Validates the configuration and prepares everything a run needs
    ///
    /// Every configuration problem (template, columns, selectors, concurrency)
    /// is reported here, before any request is made or file is created.
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        validate(&config)?;

        let template = UrlTemplate::parse(&config.scrape.url_template)?;
        let columns = Columns::compile(&config.columns)?;
        let fetcher = PageFetcher::from_config(&config.http)?;

        Ok(Self {
            config,
            template,
            columns: Arc::new(columns),
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The header row written before any data
    pub fn header_row(&self) -> Row {
        self.columns.header_row()
    }

    /// A fresh task sequence over the configured range
    pub fn tasks(&self) -> TaskSource {
        TaskSource::new(
            self.template.clone(),
            self.config.scrape.from,
            self.config.scrape.to,
        )
    }

    /// Creates the configured output file and runs the scrape into it
    pub async fn run(self) -> Result<RunSummary, ScrapeError> {
        let header = self.header_row();
        let sink = RowSink::create(Path::new(&self.config.output.path), &header)?;
        self.run_with_sink(sink).await
    }

    /// Runs the scrape into an already-opened sink
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Every task was attempted and the output flushed
    /// * `Err(ScrapeError::Sink)` - Writing the output failed; the run stopped early
    /// * `Err(ScrapeError::Worker)` - A worker or the sink thread panicked
    pub async fn run_with_sink<W>(self, mut sink: RowSink<W>) -> Result<RunSummary, ScrapeError>
    where
        W: Write + Send + 'static,
    {
        let start = Instant::now();
        let tasks = self.tasks();
        let tasks_total = tasks.remaining();

        tracing::info!(
            "Scraping {} ids [{}, {}) from {} with {} workers",
            tasks_total,
            self.config.scrape.from,
            self.config.scrape.to,
            self.template,
            self.config.scrape.concurrency
        );
        tracing::info!("Columns: {}", self.header_row().join(", "));

        let (task_tx, task_rx) = mpsc::channel(self.config.scrape.concurrency.max(1));
        let (row_tx, row_rx) = mpsc::channel(ROW_BUFFER);

        let producer = tokio::spawn(produce_tasks(tasks, task_tx));

        let writer = tokio::task::spawn_blocking(move || {
            sink.drain(row_rx)?;
            let rows_written = sink.rows_written();
            sink.finish()?;
            Ok::<_, crate::output::SinkError>(rows_written)
        });

        let pool = WorkerPool::new(
            self.config.scrape.concurrency,
            self.fetcher,
            self.columns,
            self.config.scrape.mismatch,
        );
        let report = pool.run(task_rx, row_tx).await?;

        let dispatched = producer.await?;
        let rows_written = writer.await??;

        let summary = RunSummary {
            tasks_total,
            tasks_succeeded: report.tasks_succeeded,
            tasks_failed: report.tasks_failed,
            tasks_rate_limited: report.tasks_rate_limited,
            rows_written,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Scrape completed: {} of {} tasks dispatched, {} succeeded, {} failed ({} rate limited), {} rows written in {:?}",
            dispatched,
            tasks_total,
            summary.tasks_succeeded,
            summary.tasks_failed,
            summary.tasks_rate_limited,
            summary.rows_written,
            summary.elapsed
        );

        Ok(summary)
    }
}

/// Feeds tasks to the pool until the source is exhausted or the pool is gone
async fn produce_tasks(source: TaskSource, tasks: mpsc::Sender<Task>) -> u64 {
    let mut sent = 0;
    for task in source {
        if tasks.send(task).await.is_err() {
            tracing::debug!("Task stream closed after {} tasks", sent);
            break;
        }
        sent += 1;
    }
    sent
}

/// Runs a complete scrape with the given configuration
///
/// # Example
///
/// ```no_run
/// use iterscraper::config::load_config;
/// use iterscraper::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scrape.toml"))?;
/// let summary = run_scrape(config).await?;
/// println!("{} rows", summary.rows_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config) -> Result<RunSummary, ScrapeError> {
    Coordinator::new(config)?.run().await
}
