//! Error types for the conversion engine.
//!
//! Recoverable per-frame and per-entry problems never show up here; they
//! are collected in [`crate::report::PassReport`]. Everything below stops
//! the run.

use std::path::PathBuf;

use hdmod_formats::tables::TableError;
use hdmod_formats::{InvalidScale, UnknownLocale};
use hdmod_packager::PackageError;
use hdmod_sprites::SpriteError;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required directory or file is missing
    #[error("Missing required path: {0}")]
    MissingRequired(String),

    /// A value is out of range or inconsistent
    #[error("Invalid {field}: {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Scale list entry that is not 2 or 3
    #[error(transparent)]
    InvalidScale(#[from] InvalidScale),
}

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The locale code has no display language
    #[error(transparent)]
    UnknownLocale(#[from] UnknownLocale),

    /// No locale was configured and none could be discovered
    #[error("No localized archive directory under {} and no locale configured", path.display())]
    NoLocale {
        /// Directory that was searched
        path: PathBuf,
    },

    /// A reference table failed to load
    #[error("Reference table error: {0}")]
    Table(#[from] TableError),

    /// Flag bitmaps failed to load
    #[error("Reference bitmap error: {0}")]
    Sprite(#[from] SpriteError),

    /// Writing the mod failed
    #[error("Packaging error: {0}")]
    Package(#[from] PackageError),

    /// Filesystem failure outside packaging
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled
    #[error("Run cancelled")]
    Cancelled,
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for engine operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
