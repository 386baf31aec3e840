//! Sprite alignment onto reference canvases
//!
//! HD frames are cropped tighter than the reference sprites. Each frame is
//! repasted onto a transparent canvas the size of its group's largest
//! reference frame (times the scale) at the reference anchor, so every
//! frame of a group shares one coordinate system.

use hdmod_formats::Scale;
use hdmod_formats::tables::{AlignmentTable, GroupAlignment};
use image::RgbaImage;
use image::imageops::replace;
use tracing::debug;

use crate::frame::FrameAsset;

/// Menu chrome groups that are shipped as-is
pub const MENU_GROUPS: [&str; 10] = [
    "MMENUNG", "MMENULG", "MMENUHS", "MMENUCR", "MMENUQT", "GTSINGL", "GTMULTI", "GTCAMPN",
    "GTTUTOR", "GTBACK",
];

/// Groups animated by palette cycling, which resampling would break
pub const PALETTE_GROUPS: [&str; 5] = ["WATRTL", "LAVATL", "CLRRVR", "MUDRVR", "LAVRVR"];

/// Whether a group is left out of alignment and packaging
pub fn is_excluded_group(group: &str) -> bool {
    MENU_GROUPS.contains(&group) || PALETTE_GROUPS.contains(&group)
}

/// Aligns frames of sprite groups for one scale
#[derive(Debug, Clone, Copy)]
pub struct SpriteAligner<'a> {
    table: &'a AlignmentTable,
    scale: Scale,
}

impl<'a> SpriteAligner<'a> {
    /// Aligner over `table` at `scale`
    pub const fn new(table: &'a AlignmentTable, scale: Scale) -> Self {
        Self { table, scale }
    }

    /// Align every frame of `group` in place
    ///
    /// Returns how many frames were repasted. Frames without an alignment
    /// row, and all frames of excluded or unknown groups, are untouched.
    pub fn align_group(&self, group: &str, frames: &mut [FrameAsset]) -> usize {
        if is_excluded_group(group) {
            debug!("{group}: excluded from alignment");
            return 0;
        }
        let Some(alignment) = self.table.group(group) else {
            return 0;
        };

        let mut aligned = 0;
        for frame in frames.iter_mut() {
            if self.align_frame(alignment, frame) {
                aligned += 1;
            }
        }
        debug!("{group}: aligned {aligned} of {} frames", frames.len());
        aligned
    }

    fn align_frame(&self, alignment: &GroupAlignment, frame: &mut FrameAsset) -> bool {
        let Some(record) = alignment.get(frame.name.as_str()) else {
            return false;
        };

        let factor = self.scale.factor();
        let (width, height) = alignment.canvas_size(factor);
        let (x, y) = record.paste_origin(factor);

        frame.pixels = repaste(&frame.pixels, width, height, x, y);
        if let Some(shadow) = frame.shadow.as_mut() {
            *shadow = repaste(shadow, width, height, x, y);
        }
        true
    }
}

fn repaste(image: &RgbaImage, width: u32, height: u32, x: i64, y: i64) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    replace(&mut canvas, image, x, y);
    canvas
}
