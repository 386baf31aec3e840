//! Sprite processing for HD edition assets
//!
#![allow(clippy::cast_possible_truncation)] // Pixel math is range checked before narrowing
#![allow(clippy::cast_sign_loss)] // Same
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! Takes the raw payload buffers and parsed directives of an archive entry
//! and turns them into named frames ready for packaging:
//!
//! 1. [`PayloadImages`] decodes DDS/PNG buffers to RGBA8
//! 2. [`reconstruct_entry`] crops and rotates frames (and shadows)
//! 3. [`SpriteAligner`] repastes frames onto per-group reference canvases
//! 4. [`OverlayCompositor`] derives flag and outline overlays
//!
//! Every stage is frame-local and holds no state across entries, so callers
//! may run entries or groups in parallel.

#![warn(missing_docs)]

mod align;
mod decode;
mod error;
mod frame;
/// Flag and outline overlays
pub mod overlay;
mod png;
mod reconstruct;

pub use align::{MENU_GROUPS, PALETTE_GROUPS, SpriteAligner, is_excluded_group};
pub use decode::PayloadImages;
pub use error::{SpriteError, SpriteResult};
pub use frame::{FrameAsset, OverlayAsset, OverlayKind, SHADOW_MARKER};
pub use overlay::{FlagBitmaps, OverlayCompositor};
pub use png::encode_png;
pub use reconstruct::{MAX_CROP_PIXELS, Reconstructed, crop, reconstruct_entry, rotate};
