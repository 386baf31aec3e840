//! PNG encoding

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::SpriteResult;

/// Encode an RGBA8 image as PNG
pub fn encode_png(image: &RgbaImage) -> SpriteResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_encoding_is_stable() {
        let image = RgbaImage::from_fn(9, 5, |x, y| Rgba([x as u8, y as u8, 7, 200]));
        let first = encode_png(&image).unwrap();
        assert_eq!(first, encode_png(&image).unwrap());

        let back = image::load_from_memory(&first).unwrap().to_rgba8();
        assert_eq!(back, image);
    }
}
