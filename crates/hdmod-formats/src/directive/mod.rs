//! Frame directive types
//!
//! A directive line has at least 12 whitespace separated fields:
//!
//! ```text
//! name imageIndex v1 v2 v3 v4 x y width height rotation hasShadow
//!      [shadowImageIndex shadowX shadowY shadowWidth shadowHeight shadowRotation]
//! ```
//!
//! `v1..v4` are carried through untouched. The six shadow fields are
//! required when `hasShadow` is `1`.

mod error;
mod parser;

pub use error::DirectiveError;
pub use parser::{MIN_FIELDS, ParsedDirective, SHADOW_FIELDS, parse_directive};

use crate::CanonicalName;

/// Crop rectangle in source pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge (may lie outside the source)
    pub x: i32,
    /// Top edge (may lie outside the source)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Clockwise quarter turn applied after cropping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// No rotation
    #[default]
    None,
    /// 90° clockwise
    Quarter,
    /// 180°
    Half,
    /// 270° clockwise
    ThreeQuarters,
}

impl Rotation {
    /// Map a quadrant field (`0..=3`) to a rotation
    pub const fn from_quadrant(quadrant: u8) -> Option<Self> {
        match quadrant {
            0 => Some(Self::None),
            1 => Some(Self::Quarter),
            2 => Some(Self::Half),
            3 => Some(Self::ThreeQuarters),
            _ => None,
        }
    }

    /// Quadrant field value
    pub const fn quadrant(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Quarter => 1,
            Self::Half => 2,
            Self::ThreeQuarters => 3,
        }
    }

    /// Odd quadrants swap width and height
    pub const fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Quarter | Self::ThreeQuarters)
    }

    /// Output dimensions for a `width × height` crop
    pub const fn output_size(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Shadow sub-rect of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowDirective {
    /// Payload image the shadow is cut from
    pub image_index: usize,
    /// Crop rect in that image
    pub rect: CropRect,
    /// Rotation after cropping
    pub rotation: Rotation,
}

/// Instructions for extracting one named frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDirective {
    /// Canonical frame name
    pub frame_name: CanonicalName,
    /// Payload image the frame is cut from
    pub image_index: usize,
    /// Opaque `v1..v4` fields
    pub metadata: [String; 4],
    /// Crop rect
    pub rect: CropRect,
    /// Rotation after cropping
    pub rotation: Rotation,
    /// Optional shadow layer
    pub shadow: Option<ShadowDirective>,
}

impl ImageDirective {
    /// Dimensions of the reconstructed frame
    pub fn output_size(&self) -> (u32, u32) {
        self.rotation.output_size(self.rect.width, self.rect.height)
    }
}
