/// Worker state definitions for the scrape pool
///
/// Each worker cycles `Idle → Fetching → Extracting → Emitting → Idle` once per
/// task and moves to `Done` when the task stream is exhausted.
use std::fmt;

/// Represents what a worker is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting for the next task
    Idle,

    /// Performing the HTTP request for a task
    Fetching,

    /// Parsing the page and running the column selectors
    Extracting,

    /// Handing the task's rows to the sink
    Emitting,

    /// The task stream is closed; the worker has exited
    Done,
}

impl WorkerState {
    /// Returns true if the worker holds a task in this state
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Fetching | Self::Extracting | Self::Emitting)
    }

    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if a worker may move from `self` to `next`
    ///
    /// A failed fetch or extraction drops the task, so both busy states may
    /// fall straight back to `Idle`.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Idle, Done)
                | (Fetching, Extracting)
                | (Fetching, Idle)
                | (Extracting, Emitting)
                | (Extracting, Idle)
                | (Emitting, Idle)
                | (Emitting, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Emitting => "emitting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
