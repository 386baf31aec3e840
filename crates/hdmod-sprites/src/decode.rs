//! Payload image decoding

use hdmod_formats::CanonicalName;
use image::RgbaImage;
use tracing::warn;

use crate::error::{SpriteError, SpriteResult};

/// Decoded payload images of one entry
///
/// Slots that failed to decode stay `None` so directive indices keep
/// pointing at the right buffer.
#[derive(Debug, Clone, Default)]
pub struct PayloadImages {
    images: Vec<Option<RgbaImage>>,
}

impl PayloadImages {
    /// Decode raw DDS or PNG buffers to RGBA8
    pub fn decode(group: &str, buffers: &[Vec<u8>]) -> Self {
        let images = buffers
            .iter()
            .enumerate()
            .map(|(index, buffer)| match image::load_from_memory(buffer) {
                Ok(image) => Some(image.to_rgba8()),
                Err(e) => {
                    warn!("{group}: payload image {index} is not decodable: {e}");
                    None
                }
            })
            .collect();
        Self { images }
    }

    /// Wrap already decoded images
    pub fn from_images(images: Vec<Option<RgbaImage>>) -> Self {
        Self { images }
    }

    /// Image at `index` for `frame`
    pub fn fetch(&self, frame: &CanonicalName, index: usize) -> SpriteResult<&RgbaImage> {
        match self.images.get(index) {
            Some(Some(image)) => Ok(image),
            Some(None) => Err(SpriteError::UndecodableImage {
                frame: frame.clone(),
                index,
            }),
            None => Err(SpriteError::ImageIndexOutOfRange {
                frame: frame.clone(),
                index,
                available: self.images.len(),
            }),
        }
    }

    /// First image, if it decoded
    pub fn first(&self) -> Option<&RgbaImage> {
        self.images.first().and_then(Option::as_ref)
    }

    /// Number of payload slots
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when the entry had no payload images
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Indices that failed to decode
    pub fn undecodable(&self) -> impl Iterator<Item = usize> + '_ {
        self.images
            .iter()
            .enumerate()
            .filter_map(|(i, image)| image.is_none().then_some(i))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::encode_png;
    use image::Rgba;

    #[test]
    fn test_decode_png_and_garbage() {
        let png = encode_png(&RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]))).unwrap();
        let images = PayloadImages::decode("TEST", &[png, b"not an image".to_vec()]);

        assert_eq!(images.len(), 2);
        assert_eq!(images.undecodable().collect::<Vec<_>>(), vec![1]);

        let frame = CanonicalName::new("F");
        assert_eq!(images.fetch(&frame, 0).unwrap().dimensions(), (3, 2));
        assert!(matches!(
            images.fetch(&frame, 1),
            Err(SpriteError::UndecodableImage { index: 1, .. })
        ));
        assert!(matches!(
            images.fetch(&frame, 2),
            Err(SpriteError::ImageIndexOutOfRange {
                index: 2,
                available: 2,
                ..
            })
        ));
    }
}
