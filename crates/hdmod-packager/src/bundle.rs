//! In-memory mod bundles
//!
//! A bundle collects everything that ends up in one `content.zip`: flat
//! bitmaps under `data<scale>x/`, sprite frames under
//! `sprites<scale>x/<group>/` and one manifest per group next to them.

use std::collections::{BTreeMap, BTreeSet};

use hdmod_formats::tables::GroupAlignment;
use hdmod_formats::{CanonicalName, Scale};
use hdmod_sprites::{FrameAsset, OverlayAsset, encode_png, is_excluded_group};
use tracing::{debug, warn};

use crate::error::PackageResult;
use crate::json::to_json_pretty;
use crate::manifest::AnimationManifest;

/// Full-screen bitmaps that are never shipped
pub const BITMAP_EXCLUSIONS: [&str; 7] = [
    "MAINMENU", "GAMSELBK", "GSELPOP1", "SCSELBCK", "LOADGAME", "NEWGAME", "LOADBAR",
];

/// Which bundle of a scale an asset goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BundleKey {
    /// Resolution scale
    pub scale: Scale,
    /// Whether the asset came from a `LOC` archive
    pub localized: bool,
}

/// Files of one `content.zip`, keyed by archive path
#[derive(Debug, Clone)]
pub struct ModBundle {
    key: BundleKey,
    files: BTreeMap<String, Vec<u8>>,
    manifests: BTreeMap<CanonicalName, AnimationManifest>,
    bitmaps: usize,
}

impl ModBundle {
    /// Empty bundle
    pub fn new(key: BundleKey) -> Self {
        Self {
            key,
            files: BTreeMap::new(),
            manifests: BTreeMap::new(),
            bitmaps: 0,
        }
    }

    /// Bundle key
    pub fn key(&self) -> BundleKey {
        self.key
    }

    fn bitmap_dir(&self) -> String {
        format!("data{}x", self.key.scale)
    }

    fn sprite_dir(&self) -> String {
        format!("sprites{}x", self.key.scale)
    }

    fn insert(&mut self, path: String, bytes: Vec<u8>) {
        if self.files.insert(path.clone(), bytes).is_some() {
            warn!("{path} produced twice, keeping the last one");
        }
    }

    /// Add a standalone bitmap
    ///
    /// Returns `false` for excluded bitmaps.
    pub fn add_bitmap(&mut self, frame: &FrameAsset) -> PackageResult<bool> {
        if BITMAP_EXCLUSIONS.contains(&frame.name.as_str()) {
            debug!("{}: excluded bitmap", frame.name);
            return Ok(false);
        }
        let path = format!("{}/{}", self.bitmap_dir(), frame.file_name());
        self.insert(path, encode_png(&frame.pixels)?);
        self.bitmaps += 1;
        Ok(true)
    }

    /// Add a sprite group with its frames, shadows and overlays
    ///
    /// Groups on the exclusion lists or without alignment rows are skipped
    /// and `false` is returned.
    pub fn add_sprite_group(
        &mut self,
        group: &CanonicalName,
        frames: &[FrameAsset],
        overlays: &[OverlayAsset],
        alignment: Option<&GroupAlignment>,
    ) -> PackageResult<bool> {
        if is_excluded_group(group.as_str()) {
            debug!("{group}: excluded group");
            return Ok(false);
        }
        let Some(alignment) = alignment else {
            debug!("{group}: no alignment rows, not packaged");
            return Ok(false);
        };

        let base = format!("{}/{group}", self.sprite_dir());
        let mut present = BTreeSet::new();
        for frame in frames {
            self.insert(format!("{base}/{}", frame.file_name()), encode_png(&frame.pixels)?);
            if let Some(shadow) = &frame.shadow {
                self.insert(format!("{base}/{}", frame.shadow_file_name()), encode_png(shadow)?);
            }
            present.insert(frame.name.clone());
        }
        for overlay in overlays {
            self.insert(format!("{base}/{}", overlay.file_name()), encode_png(&overlay.pixels)?);
        }

        let manifest = AnimationManifest::build(group, alignment, &present);
        self.insert(format!("{base}.json"), to_json_pretty(&manifest)?);
        self.manifests.insert(group.clone(), manifest);
        Ok(true)
    }

    /// Move everything from `other` into this bundle
    ///
    /// Lets callers build partial bundles on worker threads. Paths present
    /// in both keep `other`'s contents.
    pub fn merge(&mut self, other: Self) {
        if other.key != self.key {
            warn!(
                "merging bundle for x{} (localized: {}) into x{} (localized: {})",
                other.key.scale, other.key.localized, self.key.scale, self.key.localized
            );
        }
        for (path, bytes) in other.files {
            self.insert(path, bytes);
        }
        self.manifests.extend(other.manifests);
        self.bitmaps += other.bitmaps;
    }

    /// Archive paths and contents in sorted order
    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    /// Manifest of a packaged group
    pub fn manifest(&self, group: &str) -> Option<&AnimationManifest> {
        self.manifests.get(group)
    }

    /// Number of packaged bitmaps
    pub fn bitmap_count(&self) -> usize {
        self.bitmaps
    }

    /// Number of packaged sprite groups
    pub fn group_count(&self) -> usize {
        self.manifests.len()
    }

    /// True when nothing was added
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
