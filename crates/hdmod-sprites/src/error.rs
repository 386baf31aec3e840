//! Sprite stage error types

use std::path::PathBuf;

use hdmod_formats::CanonicalName;
use thiserror::Error;

/// Errors raised while turning payload images into frames
#[derive(Debug, Error)]
pub enum SpriteError {
    /// A directive referenced a payload image the entry does not have
    #[error("frame {frame}: image index {index} out of range ({available} decoded)")]
    ImageIndexOutOfRange {
        /// Frame being reconstructed
        frame: CanonicalName,
        /// Requested payload index
        index: usize,
        /// Number of payload images in the entry
        available: usize,
    },

    /// A directive referenced a payload image that failed to decode
    #[error("frame {frame}: payload image {index} could not be decoded")]
    UndecodableImage {
        /// Frame being reconstructed
        frame: CanonicalName,
        /// Payload index
        index: usize,
    },

    /// A directive asked for a crop larger than any frame can be
    #[error("frame {frame}: crop {width}x{height} exceeds {limit} pixels")]
    OversizedCrop {
        /// Frame being reconstructed
        frame: CanonicalName,
        /// Requested crop width
        width: u32,
        /// Requested crop height
        height: u32,
        /// Pixel limit in force
        limit: u64,
    },

    /// A flag bitmap could not be loaded
    #[error("failed to load flag bitmap {}: {source}", path.display())]
    FlagBitmap {
        /// Bitmap file
        path: PathBuf,
        /// Underlying decode or I/O error
        #[source]
        source: image::ImageError,
    },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl SpriteError {
    /// Whether the error only affects a single frame
    pub const fn is_frame_local(&self) -> bool {
        matches!(
            self,
            Self::ImageIndexOutOfRange { .. }
                | Self::UndecodableImage { .. }
                | Self::OversizedCrop { .. }
        )
    }
}

/// Result type for sprite operations
pub type SpriteResult<T> = Result<T, SpriteError>;
