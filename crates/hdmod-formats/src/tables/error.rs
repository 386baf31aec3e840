//! Reference table error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors while loading a reference table
///
/// Tables are loaded once at startup, so every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read a table file
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Table file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The alignment CSV could not be deserialized
    #[error("invalid alignment table: {0}")]
    Csv(#[from] csv::Error),

    /// A whitespace table line with bad content
    #[error("line {line}: {reason}")]
    Invalid {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// Any of the above, attributed to a file
    #[error("{}: {source}", path.display())]
    InFile {
        /// Table file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: Box<TableError>,
    },
}

impl TableError {
    pub(crate) fn invalid(line: usize, reason: impl Into<String>) -> Self {
        Self::Invalid {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for table loading
pub type TableResult<T> = Result<T, TableError>;
