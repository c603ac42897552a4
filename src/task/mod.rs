//! Task generation
//!
//! A [`TaskSource`] turns a half-open id range and a [`UrlTemplate`] into an
//! ordered, lazy stream of [`Task`]s. Constructing a new source restarts the
//! sequence.

mod template;

pub use template::UrlTemplate;

use std::ops::Range;

/// One page to scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// URL with the id substituted
    pub url: String,

    /// The id this URL was built from
    pub id: i64,
}

/// Lazy sequence of tasks for ids in `[from, to)`
#[derive(Debug, Clone)]
pub struct TaskSource {
    template: UrlTemplate,
    ids: Range<i64>,
}

impl TaskSource {
    /// Creates a source for `from..to`; an inverted or empty range yields nothing
    pub fn new(template: UrlTemplate, from: i64, to: i64) -> Self {
        Self {
            template,
            ids: from..to,
        }
    }

    /// Number of tasks still to be produced
    pub fn remaining(&self) -> u64 {
        if self.ids.start >= self.ids.end {
            0
        } else {
            self.ids.end.abs_diff(self.ids.start)
        }
    }
}

impl Iterator for TaskSource {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        let id = self.ids.next()?;
        Some(Task {
            url: self.template.render(id),
            id,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> UrlTemplate {
        UrlTemplate::parse("http://x/%d").unwrap()
    }

    #[test]
    fn test_yields_contiguous_ids() {
        let tasks: Vec<Task> = TaskSource::new(template(), 3, 7).collect();
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4, 5, 6]);
        assert_eq!(tasks[0].url, "http://x/3");
        assert_eq!(tasks[3].url, "http://x/6");
    }

    #[test]
    fn test_count_matches_range_width() {
        for (from, to) in [(0, 0), (0, 1), (0, 10), (-5, 5), (100, 250)] {
            let source = TaskSource::new(template(), from, to);
            assert_eq!(source.remaining(), (to - from) as u64);
            assert_eq!(source.count() as i64, to - from);
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let source = TaskSource::new(template(), 10, 2);
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.count(), 0);
    }

    #[test]
    fn test_restart_by_reconstruction() {
        let mut first = TaskSource::new(template(), 0, 3);
        assert_eq!(first.next().map(|t| t.id), Some(0));

        let again: Vec<i64> = TaskSource::new(template(), 0, 3).map(|t| t.id).collect();
        assert_eq!(again, vec![0, 1, 2]);
    }

    #[test]
    fn test_remaining_decreases() {
        let mut source = TaskSource::new(template(), 0, 3);
        source.next();
        assert_eq!(source.remaining(), 2);
    }
}
