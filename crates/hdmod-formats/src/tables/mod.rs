//! Reference tables
//!
//! All tables live in one reference directory:
//!
//! | File | Content |
//! |------|---------|
//! | `sd_lod_sprites.csv` | alignment rows, required |
//! | `sprite_offsets.txt` | offset corrections, optional |
//! | `flag_positions.txt` | flag anchors, optional |
//!
//! Offsets are folded into the alignment rows at load time.

mod alignment;
mod error;
mod flags;
mod offsets;

pub use alignment::{AlignmentRecord, AlignmentTable, GroupAlignment};
pub use error::{TableError, TableResult};
pub use flags::{FlagAnchor, FlagSpec, FlagTable};
pub use offsets::{Offset, OffsetTable};

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use tracing::{info, warn};

/// Alignment table file name
pub const ALIGNMENT_FILE: &str = "sd_lod_sprites.csv";
/// Offset table file name
pub const OFFSETS_FILE: &str = "sprite_offsets.txt";
/// Flag anchor table file name
pub const FLAGS_FILE: &str = "flag_positions.txt";

/// Every text table a run consults
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    /// Alignment rows with offsets applied
    pub alignment: AlignmentTable,
    /// Raw offset corrections
    pub offsets: OffsetTable,
    /// Flag anchors
    pub flags: FlagTable,
}

impl ReferenceTables {
    /// Load all tables from a reference directory
    pub fn load(dir: &Path) -> TableResult<Self> {
        let alignment_path = dir.join(ALIGNMENT_FILE);
        let file = File::open(&alignment_path).map_err(|source| TableError::Io {
            path: alignment_path.clone(),
            source,
        })?;
        let mut alignment = AlignmentTable::from_reader(BufReader::new(file))
            .map_err(|e| e.in_file(&alignment_path))?;

        let offsets = match read_optional(&dir.join(OFFSETS_FILE))? {
            Some(text) => OffsetTable::parse(&text).map_err(|e| e.in_file(dir.join(OFFSETS_FILE)))?,
            None => OffsetTable::default(),
        };
        let flags = match read_optional(&dir.join(FLAGS_FILE))? {
            Some(text) => FlagTable::parse(&text).map_err(|e| e.in_file(dir.join(FLAGS_FILE)))?,
            None => FlagTable::default(),
        };

        let matched = alignment.apply_offsets(&offsets);
        if matched < offsets.len() {
            warn!(
                "{} of {} offset corrections match no alignment row",
                offsets.len() - matched.min(offsets.len()),
                offsets.len()
            );
        }

        info!(
            "Loaded reference tables: {} defs, {} offsets, {} flagged frames",
            alignment.len(),
            offsets.len(),
            flags.len()
        );

        Ok(Self {
            alignment,
            offsets,
            flags,
        })
    }
}

fn read_optional(path: &Path) -> TableResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} not found, continuing without it", path.display());
            Ok(None)
        }
        Err(source) => Err(TableError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ALIGNMENT_FILE),
            "defname;imagename;group;frame;left_margin;top_margin;full_width;full_height\nD;A;0;0;4;4;10;10\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(OFFSETS_FILE), "D A 1 1\n").unwrap();

        let tables = ReferenceTables::load(dir.path()).unwrap();
        let record = tables.alignment.group("D").unwrap().get("A").unwrap();
        assert_eq!(record.offset, Some(Offset { dx: 1, dy: 1 }));
        assert!(tables.flags.is_empty());
    }

    #[test]
    fn test_missing_alignment_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReferenceTables::load(dir.path()).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn test_bad_flag_table_names_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ALIGNMENT_FILE),
            "defname;imagename;group;frame;left_margin;top_margin;full_width;full_height\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(FLAGS_FILE), "F 3 0 0\n").unwrap();

        let err = ReferenceTables::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(FLAGS_FILE));
        assert!(matches!(err, TableError::InFile { .. }));
    }
}
