//! Archive discovery under an HD edition install
//!
//! ```text
//! <input>/data/*.pak              language-independent archives
//! <input>/data/LOC/<code>/*.pak   localized archives, first <code> wins
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use hdmod_formats::Scale;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// Directory holding the per-language archive directories
pub const LOCALIZED_DIR: &str = "LOC";

const ARCHIVE_EXTENSION: &str = "pak";

/// What an archive holds and which bundle it feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetCategory {
    /// Flat bitmaps shared by every language
    CommonBitmap,
    /// Flat bitmaps with baked-in text
    LocalizedBitmap,
    /// Animated sprite groups shared by every language
    CommonSprite,
    /// Animated sprite groups with baked-in text
    LocalizedSprite,
}

impl AssetCategory {
    /// Classify a file by name and location
    pub fn classify(file_name: &str, localized: bool) -> Self {
        let sprite = file_name.to_ascii_lowercase().contains("sprite");
        match (sprite, localized) {
            (false, false) => Self::CommonBitmap,
            (false, true) => Self::LocalizedBitmap,
            (true, false) => Self::CommonSprite,
            (true, true) => Self::LocalizedSprite,
        }
    }

    /// Archive feeds the translation bundle
    pub const fn is_localized(self) -> bool {
        matches!(self, Self::LocalizedBitmap | Self::LocalizedSprite)
    }

    /// Archive entries are sprite groups rather than bitmaps
    pub const fn is_sprite(self) -> bool {
        matches!(self, Self::CommonSprite | Self::LocalizedSprite)
    }
}

/// One archive on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    /// Full path
    pub path: PathBuf,
    /// Content category
    pub category: AssetCategory,
}

impl ArchiveSource {
    /// File name for logs and reports
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// True when the file name carries the scale marker
    pub fn matches_scale(&self, scale: Scale) -> bool {
        self.file_name()
            .to_ascii_lowercase()
            .contains(&scale.archive_marker())
    }
}

/// All archives found under an install
#[derive(Debug, Clone, Default)]
pub struct ArchiveSet {
    /// Locale code taken from the `LOC` directory name
    pub locale_code: Option<String>,
    /// Archives in sorted path order, common ones first
    pub archives: Vec<ArchiveSource>,
}

impl ArchiveSet {
    /// Scan `<input>/data`
    pub fn discover(data_dir: &Path) -> PipelineResult<Self> {
        let mut archives = list_archives(data_dir)?
            .into_iter()
            .map(|path| {
                let name = file_name(&path);
                ArchiveSource {
                    category: AssetCategory::classify(&name, false),
                    path,
                }
            })
            .collect::<Vec<_>>();

        let loc_root = data_dir.join(LOCALIZED_DIR);
        let mut locale_code = None;
        if loc_root.is_dir() {
            if let Some(dir) = first_subdir(&loc_root)? {
                let code = file_name(&dir);
                debug!("Using localized archives from {}", dir.display());
                archives.extend(list_archives(&dir)?.into_iter().map(|path| {
                    let name = file_name(&path);
                    ArchiveSource {
                        category: AssetCategory::classify(&name, true),
                        path,
                    }
                }));
                locale_code = Some(code);
            } else {
                warn!("{} holds no language directory", loc_root.display());
            }
        }

        Ok(Self {
            locale_code,
            archives,
        })
    }

    /// Archives belonging to one scale
    pub fn archives_for(&self, scale: Scale) -> impl Iterator<Item = &ArchiveSource> {
        self.archives.iter().filter(move |a| a.matches_scale(scale))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_dir_sorted(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)
        .map_err(|e| PipelineError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::io(dir, e))?;
    paths.sort();
    Ok(paths)
}

fn list_archives(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        })
        .collect())
}

fn first_subdir(dir: &Path) -> PipelineResult<Option<PathBuf>> {
    Ok(read_dir_sorted(dir)?.into_iter().find(|p| p.is_dir()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            AssetCategory::classify("bitmap_DXT_com_x2.pak", false),
            AssetCategory::CommonBitmap
        );
        assert_eq!(
            AssetCategory::classify("SPRITE_DXT_loc_x3.pak", true),
            AssetCategory::LocalizedSprite
        );
        assert!(AssetCategory::LocalizedBitmap.is_localized());
        assert!(!AssetCategory::CommonSprite.is_localized());
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        touch(&data.join("sprite_DXT_com_x3.pak"));
        touch(&data.join("bitmap_DXT_com_x2.pak"));
        touch(&data.join("readme.txt"));
        touch(&data.join("LOC/RU/bitmap_DXT_loc_x2.pak"));
        touch(&data.join("LOC/DE/bitmap_DXT_loc_x2.pak"));

        let set = ArchiveSet::discover(&data).unwrap();
        assert_eq!(set.locale_code.as_deref(), Some("DE"));

        let x2: Vec<_> = set
            .archives_for(Scale::X2)
            .map(|a| (a.file_name(), a.category))
            .collect();
        assert_eq!(
            x2,
            vec![
                ("bitmap_DXT_com_x2.pak".to_string(), AssetCategory::CommonBitmap),
                ("bitmap_DXT_loc_x2.pak".to_string(), AssetCategory::LocalizedBitmap),
            ]
        );
        assert_eq!(set.archives_for(Scale::X3).count(), 1);
    }

    #[test]
    fn test_discover_without_localized() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        touch(&data.join("bitmap_DXT_com_x2.pak"));

        let set = ArchiveSet::discover(&data).unwrap();
        assert_eq!(set.locale_code, None);
        assert_eq!(set.archives.len(), 1);
    }
}
