//! Packaging error types

use std::path::PathBuf;

use hdmod_formats::UnknownLocale;
use hdmod_sprites::SpriteError;
use thiserror::Error;

/// Errors while building or writing mod bundles
///
/// All of them abort the bundle being written; nothing is finalized.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The locale code has no display language
    #[error(transparent)]
    UnknownLocale(#[from] UnknownLocale),

    /// Filesystem failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Could not move a finished file into place
    #[error("failed to finalize {}: {source}", path.display())]
    Persist {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Zip writing failed
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller asked to stop before files were finalized
    #[error("packaging aborted")]
    Aborted,

    /// A frame could not be encoded
    #[error(transparent)]
    Sprite(#[from] SpriteError),
}

impl PackageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for packaging
pub type PackageResult<T> = Result<T, PackageError>;
