//! Fixed-size worker pool
//!
//! `concurrency` workers share one task receiver. Each worker takes the next
//! task, fetches and extracts it, and sends its rows to the sink channel.
//! A failed task is logged and dropped; the worker moves on.
//!
//! The pool owns the completion barrier: [`WorkerPool::run`] returns only after
//! every worker has finished, and each worker owns a clone of the row sender,
//! so the row channel closes exactly when the last worker exits.

use crate::crawler::extractor::{extract_task_rows, Columns, ExtractError, MismatchPolicy};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::state::WorkerState;
use crate::task::Task;
use crate::{Row, ScrapeError};
use std::ops::AddAssign;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Why a single task was dropped
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Per-worker counters, returned through the join barrier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub tasks_succeeded: u64,
    pub tasks_failed: u64,
    pub tasks_rate_limited: u64,
    pub rows_emitted: u64,
}

impl AddAssign for WorkerReport {
    fn add_assign(&mut self, other: Self) {
        self.tasks_succeeded += other.tasks_succeeded;
        self.tasks_failed += other.tasks_failed;
        self.tasks_rate_limited += other.tasks_rate_limited;
        self.rows_emitted += other.rows_emitted;
    }
}

/// A fixed number of scrape workers
pub struct WorkerPool {
    concurrency: usize,
    fetcher: PageFetcher,
    columns: Arc<Columns>,
    policy: MismatchPolicy,
}

impl WorkerPool {
    /// Creates a pool; `concurrency` is clamped to at least one worker
    pub fn new(
        concurrency: usize,
        fetcher: PageFetcher,
        columns: Arc<Columns>,
        policy: MismatchPolicy,
    ) -> Self {
        Self {
            concurrency: concurrency.max(1),
            fetcher,
            columns,
            policy,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs all workers until the task stream is exhausted
    ///
    /// Takes ownership of `rows`; once this returns every row sender is gone
    /// and the sink sees its input close.
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerReport)` - Counters summed over all workers
    /// * `Err(ScrapeError::Worker)` - A worker panicked; remaining workers are aborted
    pub async fn run(
        &self,
        tasks: mpsc::Receiver<Task>,
        rows: mpsc::Sender<Row>,
    ) -> Result<WorkerReport, ScrapeError> {
        let tasks = Arc::new(Mutex::new(tasks));

        let mut join_set = JoinSet::new();
        for id in 0..self.concurrency {
            let worker = Worker {
                id,
                state: WorkerState::Idle,
                fetcher: self.fetcher.clone(),
                columns: Arc::clone(&self.columns),
                policy: self.policy,
                tasks: Arc::clone(&tasks),
                rows: rows.clone(),
            };
            join_set.spawn(worker.run());
        }
        drop(rows);

        let mut total = WorkerReport::default();
        while let Some(result) = join_set.join_next().await {
            total += result?;
        }

        Ok(total)
    }
}

struct Worker {
    id: usize,
    state: WorkerState,
    fetcher: PageFetcher,
    columns: Arc<Columns>,
    policy: MismatchPolicy,
    tasks: Arc<Mutex<mpsc::Receiver<Task>>>,
    rows: mpsc::Sender<Row>,
}

impl Worker {
    async fn run(mut self) -> WorkerReport {
        let mut report = WorkerReport::default();
        tracing::debug!(worker = self.id, "worker started");

        'tasks: loop {
            debug_assert!(
                !self.state.is_busy(),
                "worker {} asked for a task while {}",
                self.id,
                self.state
            );

            if self.rows.is_closed() {
                tracing::debug!(worker = self.id, "output closed, stopping early");
                break;
            }

            let next = {
                let mut guard = self.tasks.lock().await;
                guard.recv().await
            };

            let Some(task) = next else {
                break;
            };

            match self.process(&task).await {
                Ok(rows) => {
                    report.tasks_succeeded += 1;
                    self.transition(WorkerState::Emitting);

                    for row in rows {
                        if self.rows.send(row).await.is_err() {
                            tracing::debug!(
                                worker = self.id,
                                "output closed while emitting rows for {}",
                                task.url
                            );
                            break 'tasks;
                        }
                        report.rows_emitted += 1;
                    }
                }
                Err(TaskError::Fetch(e)) if e.is_rate_limited() => {
                    report.tasks_failed += 1;
                    report.tasks_rate_limited += 1;
                    tracing::warn!("you are being rate limited: {}", e);
                }
                Err(e) => {
                    report.tasks_failed += 1;
                    tracing::warn!("could not fetch {}: {}", task.url, e);
                }
            }

            self.transition(WorkerState::Idle);
        }

        self.transition(WorkerState::Done);
        tracing::debug!(
            worker = self.id,
            succeeded = report.tasks_succeeded,
            failed = report.tasks_failed,
            "worker finished"
        );
        report
    }

    /// Fetches and extracts one task
    async fn process(&mut self, task: &Task) -> Result<Vec<Row>, TaskError> {
        self.transition(WorkerState::Fetching);
        let page = self.fetcher.fetch(&task.url).await?;

        self.transition(WorkerState::Extracting);
        let rows = extract_task_rows(task, &page.body, &self.columns, self.policy)?;
        tracing::debug!(
            worker = self.id,
            id = task.id,
            status = page.status_code,
            rows = rows.len(),
            "extracted page"
        );

        Ok(rows)
    }

    fn transition(&mut self, next: WorkerState) {
        debug_assert!(
            !self.state.is_terminal(),
            "worker {} changed state after finishing",
            self.id
        );
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal worker transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!(worker = self.id, from = %self.state, to = %next, "worker state");
        self.state = next;
    }
}
