//! Flag pole overlays

use std::path::Path;

use hdmod_formats::Scale;
use hdmod_formats::tables::FlagSpec;
use image::RgbaImage;
use image::imageops::{FilterType, brighten, overlay, resize};
use tracing::warn;

use crate::error::{SpriteError, SpriteResult};

/// Left-facing pole bitmap file name
pub const FLAG_LEFT_FILE: &str = "flag_left.png";
/// Right-facing pole bitmap file name
pub const FLAG_RIGHT_FILE: &str = "flag_right.png";

/// Brightness added to the pole bitmaps on load
const BRIGHTEN: i32 = 48;

/// Directional flag pole bitmaps
#[derive(Debug, Clone)]
pub struct FlagBitmaps {
    left: RgbaImage,
    right: RgbaImage,
}

impl FlagBitmaps {
    /// Load both poles from a reference directory
    pub fn load(dir: &Path) -> SpriteResult<Self> {
        let open = |name: &str| {
            let path = dir.join(name);
            image::open(&path)
                .map(|image| image.to_rgba8())
                .map_err(|source| SpriteError::FlagBitmap { path, source })
        };
        Ok(Self::from_images(&open(FLAG_LEFT_FILE)?, &open(FLAG_RIGHT_FILE)?))
    }

    /// Brighten raw pole bitmaps
    pub fn from_images(left: &RgbaImage, right: &RgbaImage) -> Self {
        Self {
            left: brighten(left, BRIGHTEN),
            right: brighten(right, BRIGHTEN),
        }
    }

    /// Both poles magnified by `scale` (nearest neighbour)
    pub fn scaled(&self, scale: Scale) -> Self {
        let factor = scale.factor();
        let magnify = |image: &RgbaImage| {
            resize(
                image,
                image.width() * factor,
                image.height() * factor,
                FilterType::Nearest,
            )
        };
        Self {
            left: magnify(&self.left),
            right: magnify(&self.right),
        }
    }

    /// Bitmap for an anchor variant
    pub fn variant(&self, variant: u32) -> Option<&RgbaImage> {
        match variant {
            0 => Some(&self.left),
            1 => Some(&self.right),
            _ => None,
        }
    }
}

/// Draw every anchor of `spec` on a transparent `width × height` canvas
///
/// `bitmaps` must already be scaled; anchor coordinates are multiplied by
/// `scale` here.
pub fn flag_overlay(
    frame: &str,
    width: u32,
    height: u32,
    spec: &FlagSpec,
    bitmaps: &FlagBitmaps,
    scale: Scale,
) -> RgbaImage {
    let factor = i64::from(scale.factor());
    let mut canvas = RgbaImage::new(width, height);

    for anchor in &spec.anchors {
        let Some(pole) = bitmaps.variant(anchor.variant) else {
            warn!("{frame}: unknown flag variant {}", anchor.variant);
            continue;
        };
        overlay(
            &mut canvas,
            pole,
            i64::from(anchor.x) * factor,
            i64::from(anchor.y) * factor,
        );
    }

    canvas
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use hdmod_formats::tables::FlagAnchor;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn bitmaps() -> FlagBitmaps {
        FlagBitmaps::from_images(
            &RgbaImage::from_pixel(1, 2, Rgba([100, 0, 0, 255])),
            &RgbaImage::from_pixel(1, 2, Rgba([0, 100, 0, 255])),
        )
    }

    #[test]
    fn test_poles_are_brightened_and_scaled() {
        let scaled = bitmaps().scaled(Scale::X3);
        let left = scaled.variant(0).unwrap();
        assert_eq!(left.dimensions(), (3, 6));
        assert_eq!(*left.get_pixel(2, 5), Rgba([148, 48, 48, 255]));
        assert!(scaled.variant(2).is_none());
    }

    #[test]
    fn test_anchors_scale_with_frame() {
        let spec = FlagSpec {
            anchors: vec![
                FlagAnchor { variant: 0, x: 1, y: 0 },
                FlagAnchor { variant: 1, x: 3, y: 1 },
                FlagAnchor { variant: 7, x: 0, y: 0 },
            ],
        };
        let scaled = bitmaps().scaled(Scale::X2);
        let canvas = flag_overlay("F", 10, 10, &spec, &scaled, Scale::X2);

        let is_left = |p: &Rgba<u8>| p[3] == 255 && p[0] > p[1];
        let is_right = |p: &Rgba<u8>| p[3] == 255 && p[1] > p[0];
        assert!(is_left(canvas.get_pixel(2, 0)));
        assert!(is_left(canvas.get_pixel(3, 3)));
        assert!(is_right(canvas.get_pixel(6, 2)));
        assert!(is_right(canvas.get_pixel(7, 5)));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*canvas.get_pixel(4, 0), Rgba([0, 0, 0, 0]));
    }
}
