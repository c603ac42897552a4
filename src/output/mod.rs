//! Output module
//!
//! This module handles:
//! - Writing the header and extracted rows as CSV
//! - Summarizing what a run did

mod sink;
pub mod stats;

pub use sink::{RowSink, SinkError, SinkResult};
pub use stats::{print_summary, RunSummary};
