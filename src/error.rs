//! Error types for loading capture logs.
//!
//! Only [`LoadError::MissingSourceFile`] is recoverable: the caller degrades
//! that source to an empty capture. Everything else aborts the load of the
//! file it occurred in, but never the whole comparison.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The capture file does not exist.
    #[error("{} not found", path.display())]
    MissingSourceFile { path: PathBuf },

    /// The header row does not declare the required timestamp column.
    #[error("{}: header has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A row's timestamp field is absent or not a base-10 integer.
    #[error("{}:{line}: malformed timestamp '{value}'", path.display())]
    MalformedTimestampRow {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("failed reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Whether the run should degrade this source instead of flagging a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LoadError::MissingSourceFile { .. })
    }
}
