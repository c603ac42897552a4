//! Field extraction from HTML pages
//!
//! Every column selector is run against the document, collecting the trimmed
//! text of each match in document order. The per-column match lists are then
//! zipped positionally into rows, driven by the first column's match count:
//!
//! ```text
//! name:  [A, B, C]          row 0: url, id, A, x
//! price: [x, y]       →     row 1: url, id, B, y
//!                           row 2: url, id, C, ""   (MismatchPolicy::Pad)
//! ```
//!
//! What happens when a later column has a different number of matches is
//! decided by [`MismatchPolicy`].

use crate::config::ColumnSpec;
use crate::task::Task;
use crate::{ConfigError, Row};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the fixed first column
pub const URL_HEADER: &str = "url";

/// Name of the fixed second column
pub const ID_HEADER: &str = "id";

/// Errors raised while turning a page into rows
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("column '{header}' matched {found} elements but the first column matched {expected}")]
    ColumnMismatch {
        header: String,
        expected: usize,
        found: usize,
    },
}

/// How to zip columns whose match counts differ from the first column's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// One row per first-column match; missing cells are empty strings
    #[default]
    Pad,

    /// As many rows as the column with the fewest matches
    Truncate,

    /// Drop the task if any column's count differs from the first column's
    Fail,
}

impl MismatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Truncate => "truncate",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for MismatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MismatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pad" => Ok(Self::Pad),
            "truncate" => Ok(Self::Truncate),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown mismatch policy '{}', expected pad, truncate or fail",
                other
            )),
        }
    }
}

/// A column with its selector compiled
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    selector: Selector,
}

/// The ordered, compiled column list shared by all workers
#[derive(Debug, Clone)]
pub struct Columns {
    columns: Vec<Column>,
}

impl Columns {
    /// Compiles every column selector
    ///
    /// # Returns
    ///
    /// * `Ok(Columns)` - All selectors are valid
    /// * `Err(ConfigError)` - The list is empty or a selector does not parse
    pub fn compile(specs: &[ColumnSpec]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::Validation(
                "at least one column is required".to_string(),
            ));
        }

        let columns = specs
            .iter()
            .map(|spec| {
                let selector =
                    Selector::parse(&spec.selector).map_err(|e| ConfigError::InvalidSelector {
                        header: spec.header.clone(),
                        selector: spec.selector.clone(),
                        message: e.to_string(),
                    })?;
                Ok(Column {
                    header: spec.header.clone(),
                    selector,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { columns })
    }

    /// Number of selector columns (excluding `url` and `id`)
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of cells in every output row
    pub fn row_width(&self) -> usize {
        2 + self.columns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// The header row: `url`, `id`, then column headers in order
    pub fn header_row(&self) -> Row {
        let mut header = Vec::with_capacity(self.row_width());
        header.push(URL_HEADER.to_string());
        header.push(ID_HEADER.to_string());
        header.extend(self.columns.iter().map(|c| c.header.clone()));
        header
    }
}

/// Runs every column selector and zips the matches into rows
///
/// Each row is `base` followed by one cell per column. Zero matches for the
/// first column produce zero rows under every policy.
pub fn extract(
    document: &Html,
    columns: &Columns,
    base: &[String],
    policy: MismatchPolicy,
) -> Result<Vec<Row>, ExtractError> {
    let matches: Vec<Vec<String>> = columns
        .iter()
        .map(|column| {
            document
                .select(&column.selector)
                .map(|element| element.text().collect::<String>().trim().to_string())
                .collect()
        })
        .collect();

    let first = matches.first().map_or(0, Vec::len);
    if first == 0 {
        return Ok(Vec::new());
    }

    let row_count = match policy {
        MismatchPolicy::Pad => first,
        MismatchPolicy::Truncate => matches.iter().map(Vec::len).min().unwrap_or(0),
        MismatchPolicy::Fail => {
            if let Some((column, found)) = columns
                .iter()
                .zip(&matches)
                .map(|(column, m)| (column, m.len()))
                .find(|(_, found)| *found != first)
            {
                return Err(ExtractError::ColumnMismatch {
                    header: column.header.clone(),
                    expected: first,
                    found,
                });
            }
            first
        }
    };

    let rows = (0..row_count)
        .map(|i| {
            let mut row = Vec::with_capacity(base.len() + matches.len());
            row.extend_from_slice(base);
            row.extend(matches.iter().map(|m| m.get(i).cloned().unwrap_or_default()));
            row
        })
        .collect();

    Ok(rows)
}

/// Parses a fetched page body and extracts the rows for `task`
///
/// The parsed document lives only for the duration of this call.
pub fn extract_task_rows(
    task: &Task,
    body: &str,
    columns: &Columns,
    policy: MismatchPolicy,
) -> Result<Vec<Row>, ExtractError> {
    let document = Html::parse_document(body);
    let base = [task.url.clone(), task.id.to_string()];
    extract(&document, columns, &base, policy)
}
