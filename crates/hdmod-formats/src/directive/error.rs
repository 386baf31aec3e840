//! Directive error types

use thiserror::Error;

/// A directive line that could not be turned into frame instructions
///
/// Always recoverable: the line is skipped and the rest of the entry is
/// processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// A line with enough fields for a frame but an unusable value
    #[error("malformed directive on line {line}: {reason}")]
    Malformed {
        /// 1-based line number within the directive text
        line: usize,
        /// What was wrong
        reason: String,
    },
}

impl DirectiveError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// Line the error refers to
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. } => *line,
        }
    }
}
