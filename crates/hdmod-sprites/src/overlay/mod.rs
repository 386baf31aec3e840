//! Overlay generation
//!
//! Overlays are extra images the engine draws over a frame at runtime.
//! Flag overlays carry the team-colored poles of map objects (the engine
//! tints them), outline overlays the selection silhouette of creatures.
//! Each frame gets at most one overlay; flags take precedence.

mod flag;
mod outline;

pub use flag::{FLAG_LEFT_FILE, FLAG_RIGHT_FILE, FlagBitmaps, flag_overlay};
pub use outline::outline;

use hdmod_formats::Scale;
use hdmod_formats::tables::FlagTable;

use crate::frame::{FrameAsset, OverlayAsset, OverlayKind};

/// Frame name prefixes treated as creatures when none are configured
pub const DEFAULT_CREATURE_PREFIXES: [&str; 1] = ["C"];

/// Derives overlays from aligned frames for one scale
#[derive(Debug, Clone)]
pub struct OverlayCompositor<'a> {
    flags: &'a FlagTable,
    bitmaps: Option<FlagBitmaps>,
    creature_prefixes: Vec<String>,
    scale: Scale,
}

impl<'a> OverlayCompositor<'a> {
    /// Compositor for `scale`
    ///
    /// Without `bitmaps` no flag overlays are produced.
    pub fn new(flags: &'a FlagTable, bitmaps: Option<&FlagBitmaps>, scale: Scale) -> Self {
        Self {
            flags,
            bitmaps: bitmaps.map(|b| b.scaled(scale)),
            creature_prefixes: DEFAULT_CREATURE_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            scale,
        }
    }

    /// Replace the creature prefix set
    #[must_use]
    pub fn with_creature_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.creature_prefixes = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_uppercase())
            .filter(|p| !p.is_empty())
            .collect();
        self
    }

    fn is_creature(&self, frame: &FrameAsset) -> bool {
        !frame.is_shadow_frame()
            && self
                .creature_prefixes
                .iter()
                .any(|prefix| frame.name.starts_with(prefix))
    }

    /// Overlay for one frame, if it qualifies for any
    pub fn compose(&self, frame: &FrameAsset) -> Option<OverlayAsset> {
        let (width, height) = frame.pixels.dimensions();

        let flag = self
            .bitmaps
            .as_ref()
            .zip(self.flags.get(frame.name.as_str()))
            .map(|(bitmaps, spec)| {
                flag_overlay(frame.name.as_str(), width, height, spec, bitmaps, self.scale)
            });

        let (kind, pixels) = match flag {
            Some(pixels) => (OverlayKind::Flag, pixels),
            None if self.is_creature(frame) => (OverlayKind::Outline, outline(&frame.pixels)),
            None => return None,
        };

        Some(OverlayAsset {
            group: frame.group.clone(),
            frame: frame.name.clone(),
            kind,
            pixels,
        })
    }

    /// Overlays for a slice of frames, in frame order
    pub fn compose_all(&self, frames: &[FrameAsset]) -> Vec<OverlayAsset> {
        frames.iter().filter_map(|frame| self.compose(frame)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use hdmod_formats::CanonicalName;
    use image::{Rgba, RgbaImage};

    fn frame(name: &str) -> FrameAsset {
        FrameAsset {
            group: CanonicalName::new("G"),
            name: CanonicalName::new(name),
            pixels: RgbaImage::from_pixel(6, 6, Rgba([1, 1, 1, 255])),
            shadow: None,
        }
    }

    fn bitmaps() -> FlagBitmaps {
        let pole = RgbaImage::from_pixel(1, 1, Rgba([200, 0, 0, 255]));
        FlagBitmaps::from_images(&pole, &pole)
    }

    #[test]
    fn test_outline_only_for_creatures() {
        let flags = FlagTable::default();
        let compositor = OverlayCompositor::new(&flags, None, Scale::X2)
            .with_creature_prefixes(["cb", "cg"]);

        let overlays = compositor.compose_all(&[
            frame("CBASILA1"),
            frame("CBASILSHADOW1"),
            frame("AVWMINE0"),
            frame("CGOBLN01"),
        ]);
        let names: Vec<_> = overlays.iter().map(|o| o.frame.as_str()).collect();
        assert_eq!(names, vec!["CBASILA1", "CGOBLN01"]);
        assert!(overlays.iter().all(|o| o.kind == OverlayKind::Outline));
        assert_eq!(overlays[0].file_name(), "CBASILA1-overlay.png");
    }

    #[test]
    fn test_flag_wins_over_outline() {
        let flags = FlagTable::parse("CFLAG 1 0 1 1\n").unwrap();
        let bitmaps = bitmaps();
        let compositor = OverlayCompositor::new(&flags, Some(&bitmaps), Scale::X2);

        let overlay = compositor.compose(&frame("CFLAG")).unwrap();
        assert_eq!(overlay.kind, OverlayKind::Flag);
        assert_eq!(overlay.pixels.dimensions(), (6, 6));
        assert_eq!(overlay.pixels.get_pixel(2, 2)[3], 255);
        assert_eq!(overlay.pixels.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_flags_need_bitmaps() {
        let flags = FlagTable::parse("AVWMINE0 1 0 0 0\n").unwrap();
        let compositor = OverlayCompositor::new(&flags, None, Scale::X2);
        assert!(compositor.compose(&frame("AVWMINE0")).is_none());
    }
}
