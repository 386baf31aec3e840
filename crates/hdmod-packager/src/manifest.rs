//! Animation manifests
//!
//! One manifest per sprite group tells the engine which file holds which
//! `(group, frame)` cell of the animation.

use std::collections::BTreeSet;

use hdmod_formats::CanonicalName;
use hdmod_formats::tables::GroupAlignment;
use serde::{Deserialize, Serialize};

/// One animation cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestImage {
    /// Animation group index
    pub group: u32,
    /// Frame index inside the animation group
    pub frame: u32,
    /// Frame file, relative to `basepath`
    pub file: String,
}

/// Manifest of one sprite group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationManifest {
    /// Directory holding the group's frames
    pub basepath: String,
    /// Cells sorted by group then frame
    pub images: Vec<ManifestImage>,
}

impl AnimationManifest {
    /// Build from the alignment rows whose frame was produced
    ///
    /// Rows for frames not in `present` are left out. Ties keep table order.
    pub fn build(
        group: &CanonicalName,
        alignment: &GroupAlignment,
        present: &BTreeSet<CanonicalName>,
    ) -> Self {
        let mut images: Vec<ManifestImage> = alignment
            .rows()
            .iter()
            .filter(|row| present.contains(&row.image_name))
            .map(|row| ManifestImage {
                group: row.group,
                frame: row.frame,
                file: format!("{}.png", row.image_name),
            })
            .collect();
        images.sort_by_key(|image| (image.group, image.frame));

        Self {
            basepath: format!("{group}/"),
            images,
        }
    }
}
