//! PAK error types

use thiserror::Error;

/// Errors from walking an entry's chunk list
#[derive(Debug, Error)]
pub enum ChunkError {
    /// Chunk sizes point past the end of the payload region
    #[error("chunk {index} needs {needed} bytes at offset {offset}, payload holds {available}")]
    Truncated {
        /// Zero-based chunk index
        index: usize,
        /// Cursor offset inside the payload region
        offset: usize,
        /// Compressed size of the chunk
        needed: usize,
        /// Bytes in the payload region
        available: usize,
    },

    /// Neither stored bytes nor any inflate pass produced data
    #[error("no image data recovered")]
    Empty,
}

/// PAK-specific error type
#[derive(Debug, Error)]
pub enum PakError {
    /// Header, entry table or an offset runs past the end of the file
    #[error("malformed archive: {reason}")]
    MalformedArchive {
        /// What was out of range
        reason: String,
    },

    /// A single entry could not be decoded; the rest of the archive is intact
    #[error("entry {id}: {source}")]
    Entry {
        /// Entry id as stored in the table
        id: String,
        /// Chunk walk failure
        #[source]
        source: ChunkError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl PakError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedArchive {
            reason: reason.into(),
        }
    }

    /// True when the whole archive must be abandoned
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Entry { .. })
    }
}

/// Result type for PAK operations
pub type PakResult<T> = Result<T, PakError>;
