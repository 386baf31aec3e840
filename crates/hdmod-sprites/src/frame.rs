//! Frame and overlay assets

use hdmod_formats::CanonicalName;
use image::RgbaImage;

/// Marker that identifies shadow frames by name
pub const SHADOW_MARKER: &str = "SHADOW";

/// One named frame of a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAsset {
    /// Owning group (the archive entry id)
    pub group: CanonicalName,
    /// Frame name
    pub name: CanonicalName,
    /// Frame pixels
    pub pixels: RgbaImage,
    /// Shadow layer, when the directive carried one
    pub shadow: Option<RgbaImage>,
}

impl FrameAsset {
    /// File name of the primary image
    pub fn file_name(&self) -> String {
        format!("{}.png", self.name)
    }

    /// File name of the shadow image
    pub fn shadow_file_name(&self) -> String {
        format!("{}-shadow.png", self.name)
    }

    /// Whether the frame itself is a shadow frame
    pub fn is_shadow_frame(&self) -> bool {
        self.name.contains(SHADOW_MARKER)
    }
}

/// Derived image drawn on top of a frame at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayAsset {
    /// Owning group
    pub group: CanonicalName,
    /// Frame the overlay belongs to
    pub frame: CanonicalName,
    /// Which generator produced it
    pub kind: OverlayKind,
    /// Overlay pixels, same size as the frame
    pub pixels: RgbaImage,
}

impl OverlayAsset {
    /// File name of the overlay image
    pub fn file_name(&self) -> String {
        format!("{}-overlay.png", self.frame)
    }
}

/// Overlay generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Team-color flag poles
    Flag,
    /// Creature silhouette outline
    Outline,
}
