//! Creature outline overlays

use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Alpha amplification before edge detection
const ALPHA_GAIN: u16 = 4;

/// Edge detection kernel, centre weighted
const EDGE_KERNEL: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]];

fn sample(image: &GrayImage, x: i64, y: i64) -> i32 {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return 0;
    }
    i32::from(image.get_pixel(x as u32, y as u32)[0])
}

fn edges(alpha: &GrayImage) -> GrayImage {
    GrayImage::from_fn(alpha.width(), alpha.height(), |x, y| {
        let mut sum = 0;
        for (ky, row) in EDGE_KERNEL.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                let sx = i64::from(x) + kx as i64 - 1;
                let sy = i64::from(y) + ky as i64 - 1;
                sum += weight * sample(alpha, sx, sy);
            }
        }
        Luma([sum.clamp(0, 255) as u8])
    })
}

fn dilate(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let mut max = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                max = max.max(sample(image, i64::from(x) + dx, i64::from(y) + dy));
            }
        }
        Luma([max as u8])
    })
}

/// White silhouette edge of `pixels`, thickened by one pixel
pub fn outline(pixels: &RgbaImage) -> RgbaImage {
    let alpha = GrayImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let a = u16::from(pixels.get_pixel(x, y)[3]) * ALPHA_GAIN;
        Luma([a.min(255) as u8])
    });
    let edge = dilate(&edges(&alpha));

    RgbaImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        Rgba([255, 255, 255, edge.get_pixel(x, y)[0]])
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_frame_has_no_outline() {
        let out = outline(&RgbaImage::new(5, 5));
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_solid_interior_has_no_edge() {
        // A 7x7 opaque block inside a 15x15 frame: the block centre is more
        // than two pixels from any edge and stays clear after dilation.
        let mut frame = RgbaImage::new(15, 15);
        for y in 4..11 {
            for x in 4..11 {
                frame.put_pixel(x, y, Rgba([10, 20, 30, 255]));
            }
        }
        let out = outline(&frame);

        assert_eq!(out.get_pixel(7, 7)[3], 0);
        assert_eq!(out.get_pixel(4, 7)[3], 255);
        // Dilation reaches one pixel to either side of the edge ring
        assert_eq!(out.get_pixel(3, 7)[3], 255);
        assert_eq!(out.get_pixel(5, 7)[3], 255);
        assert_eq!(out.get_pixel(2, 7)[3], 0);
        assert_eq!(*out.get_pixel(4, 7), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_faint_alpha_is_amplified() {
        let mut frame = RgbaImage::new(5, 5);
        frame.put_pixel(2, 2, Rgba([0, 0, 0, 10]));
        let out = outline(&frame);
        // 10 * 4 * 8 saturates at the centre pixel
        assert_eq!(out.get_pixel(2, 2)[3], 255);
        assert_eq!(out.get_pixel(4, 4)[3], 0);
    }
}
