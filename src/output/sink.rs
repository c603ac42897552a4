//! CSV row sink
//!
//! The sink is the only writer of the output file. It writes the header row as
//! soon as it is opened, then every row in the order it arrives, and flushes
//! when the row stream closes.
//!
//! Any write failure is fatal to the run. Rows already flushed stay on disk;
//! discarding a partial file is left to the caller.

use crate::Row;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while writing the output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("unable to create file {path}: {source}")]
    Create {
        path: String,
        source: std::io::Error,
    },

    #[error("could not write record to {path}: {source}")]
    Write { path: String, source: csv::Error },

    #[error("could not flush {path}: {source}")]
    Flush {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Serializes rows as CSV to a single output
pub struct RowSink<W: Write> {
    writer: csv::Writer<W>,
    name: String,
    rows_written: u64,
}

impl RowSink<File> {
    /// Creates (or truncates) the file at `path` and writes the header row
    pub fn create(path: &Path, header: &[String]) -> SinkResult<Self> {
        let name = path.display().to_string();
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: name.clone(),
            source,
        })?;
        Self::from_writer(file, name, header)
    }
}

impl<W: Write> RowSink<W> {
    /// Wraps any writer and writes the header row
    ///
    /// `name` identifies the output in error messages. The header is flushed
    /// immediately so a broken output is reported before any page is fetched.
    pub fn from_writer(inner: W, name: impl Into<String>, header: &[String]) -> SinkResult<Self> {
        let mut sink = Self {
            writer: csv::Writer::from_writer(inner),
            name: name.into(),
            rows_written: 0,
        };

        sink.writer
            .write_record(header)
            .map_err(|source| SinkError::Write {
                path: sink.name.clone(),
                source,
            })?;
        sink.flush()?;

        Ok(sink)
    }

    /// Writes one row
    ///
    /// Rows must have as many cells as the header; the CSV writer rejects
    /// anything else.
    pub fn write_row(&mut self, row: &[String]) -> SinkResult<()> {
        self.writer
            .write_record(row)
            .map_err(|source| SinkError::Write {
                path: self.name.clone(),
                source,
            })?;
        self.rows_written += 1;
        Ok(())
    }

    /// Writes rows from `rows` until every sender has been dropped
    ///
    /// Blocks the current thread; run it on a blocking task.
    pub fn drain(&mut self, mut rows: mpsc::Receiver<Row>) -> SinkResult<()> {
        while let Some(row) = rows.blocking_recv() {
            self.write_row(&row)?;
        }
        Ok(())
    }

    /// Number of rows written so far, not counting the header
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flush(&mut self) -> SinkResult<()> {
        self.writer.flush().map_err(|source| SinkError::Flush {
            path: self.name.clone(),
            source,
        })
    }

    /// Flushes remaining output and returns the underlying writer
    pub fn finish(self) -> SinkResult<W> {
        let name = self.name;
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Flush {
                path: name,
                source: e.into_error(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn header() -> Row {
        vec!["url".to_string(), "id".to_string(), "name".to_string()]
    }

    fn row(url: &str, id: &str, name: &str) -> Row {
        vec![url.to_string(), id.to_string(), name.to_string()]
    }

    fn output(sink: RowSink<Vec<u8>>) -> String {
        String::from_utf8(sink.finish().unwrap()).unwrap()
    }

    /// Accepts `limit` bytes, then fails every write
    struct FailingWriter {
        written: usize,
        limit: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_header_written_without_rows() {
        let sink = RowSink::from_writer(Vec::new(), "memory", &header()).unwrap();
        assert_eq!(output(sink), "url,id,name\n");
    }

    #[test]
    fn test_rows_written_in_arrival_order() {
        let mut sink = RowSink::from_writer(Vec::new(), "memory", &header()).unwrap();
        sink.write_row(&row("http://x/1", "1", "B")).unwrap();
        sink.write_row(&row("http://x/0", "0", "A")).unwrap();
        assert_eq!(sink.rows_written(), 2);
        assert_eq!(
            output(sink),
            "url,id,name\nhttp://x/1,1,B\nhttp://x/0,0,A\n"
        );
    }

    #[test]
    fn test_cells_are_quoted() {
        let mut sink = RowSink::from_writer(Vec::new(), "memory", &header()).unwrap();
        sink.write_row(&row("http://x/0", "0", "a, \"b\"\nc"))
            .unwrap();
        assert_eq!(
            output(sink),
            "url,id,name\nhttp://x/0,0,\"a, \"\"b\"\"\nc\"\n"
        );
    }

    #[test]
    fn test_row_width_must_match_header() {
        let mut sink = RowSink::from_writer(Vec::new(), "memory", &header()).unwrap();
        let result = sink.write_row(&["http://x/0".to_string(), "0".to_string()]);
        assert!(matches!(result, Err(SinkError::Write { .. })));
    }

    #[test]
    fn test_drain_until_senders_dropped() {
        let mut sink = RowSink::from_writer(Vec::new(), "memory", &header()).unwrap();
        let (tx, rx) = mpsc::channel(8);
        tx.blocking_send(row("http://x/0", "0", "A")).unwrap();
        tx.blocking_send(row("http://x/0", "0", "B")).unwrap();
        drop(tx);

        sink.drain(rx).unwrap();
        assert_eq!(sink.rows_written(), 2);
        assert_eq!(
            output(sink),
            "url,id,name\nhttp://x/0,0,A\nhttp://x/0,0,B\n"
        );
    }

    #[test]
    fn test_header_failure_is_reported_on_open() {
        let writer = FailingWriter {
            written: 0,
            limit: 0,
        };
        let result = RowSink::from_writer(writer, "broken", &header());
        match result {
            Err(SinkError::Flush { path, .. }) => assert_eq!(path, "broken"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("header write should fail"),
        }
    }

    #[test]
    fn test_mid_stream_failure_is_fatal() {
        let writer = FailingWriter {
            written: 0,
            limit: "url,id,name\n".len(),
        };
        let mut sink = RowSink::from_writer(writer, "broken", &header()).unwrap();
        sink.write_row(&row("http://x/0", "0", "A")).unwrap();
        assert!(matches!(sink.finish(), Err(SinkError::Flush { .. })));
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = RowSink::create(&path, &header());
        assert!(matches!(result, Err(SinkError::Create { .. })));
    }

    #[test]
    fn test_create_writes_header_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = RowSink::create(&path, &header()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "url,id,name\n");
        sink.finish().unwrap();
    }
}
