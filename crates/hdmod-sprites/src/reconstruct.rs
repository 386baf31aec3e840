//! Frame reconstruction: crop and rotate payload images per directive

use hdmod_formats::CanonicalName;
use hdmod_formats::directive::{CropRect, ImageDirective, Rotation};
use image::RgbaImage;
use image::imageops::{replace, rotate90, rotate180, rotate270};
use tracing::{debug, warn};

use crate::decode::PayloadImages;
use crate::error::{SpriteError, SpriteResult};
use crate::frame::FrameAsset;

/// Largest crop, in pixels, a directive may request
///
/// Well above the largest x3 backdrop; directives past it are corrupt.
pub const MAX_CROP_PIXELS: u64 = 1 << 26;

/// Cut `rect` out of `source`
///
/// Parts of the rect outside the source come out transparent. The canvas
/// is allocated at the rect's size, so callers reading rects from archive
/// data bound them against [`MAX_CROP_PIXELS`] first.
pub fn crop(source: &RgbaImage, rect: CropRect) -> RgbaImage {
    let mut canvas = RgbaImage::new(rect.width, rect.height);
    replace(&mut canvas, source, -i64::from(rect.x), -i64::from(rect.y));
    canvas
}

/// Rotate clockwise by the rotation's quarter turns
pub fn rotate(image: RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::None => image,
        Rotation::Quarter => rotate90(&image),
        Rotation::Half => rotate180(&image),
        Rotation::ThreeQuarters => rotate270(&image),
    }
}

fn cut(
    images: &PayloadImages,
    frame: &CanonicalName,
    index: usize,
    rect: CropRect,
    rotation: Rotation,
) -> SpriteResult<RgbaImage> {
    let source = images.fetch(frame, index)?;
    if u64::from(rect.width) * u64::from(rect.height) > MAX_CROP_PIXELS {
        return Err(SpriteError::OversizedCrop {
            frame: frame.clone(),
            width: rect.width,
            height: rect.height,
            limit: MAX_CROP_PIXELS,
        });
    }
    Ok(rotate(crop(source, rect), rotation))
}

/// Frames of one entry plus the errors of the frames that were skipped
#[derive(Debug, Default)]
pub struct Reconstructed {
    /// Frames in directive order
    pub frames: Vec<FrameAsset>,
    /// Per-frame failures
    pub errors: Vec<SpriteError>,
}

/// Reconstruct every frame of an entry
///
/// A frame whose primary image fails is skipped. A frame whose shadow
/// fails keeps its primary image and loses the shadow; both failures are
/// reported.
pub fn reconstruct_entry(
    group: &CanonicalName,
    images: &PayloadImages,
    directives: &[ImageDirective],
) -> Reconstructed {
    let mut out = Reconstructed::default();

    for directive in directives {
        let frame = &directive.frame_name;
        let pixels = match cut(images, frame, directive.image_index, directive.rect, directive.rotation) {
            Ok(pixels) => pixels,
            Err(e) => {
                warn!("{group}: skipping frame: {e}");
                out.errors.push(e);
                continue;
            }
        };

        let shadow = match directive.shadow {
            Some(shadow) => match cut(images, frame, shadow.image_index, shadow.rect, shadow.rotation) {
                Ok(pixels) => Some(pixels),
                Err(e) => {
                    warn!("{group}: dropping shadow: {e}");
                    out.errors.push(e);
                    None
                }
            },
            None => None,
        };

        out.frames.push(FrameAsset {
            group: group.clone(),
            name: frame.clone(),
            pixels,
            shadow,
        });
    }

    debug!(
        "{group}: reconstructed {} of {} frames",
        out.frames.len(),
        directives.len()
    );
    out
}
