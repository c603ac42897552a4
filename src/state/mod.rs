//! State module for tracking worker progress
//!
//! - `WorkerState`: what a single pool worker is doing (idle, fetching, extracting, emitting, done)

mod worker_state;

pub use worker_state::WorkerState;
