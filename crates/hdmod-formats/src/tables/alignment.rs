//! Sprite alignment table
//!
//! Semicolon separated with a header row. Each row places one image of a
//! def (sprite group) inside that def's full-size frame in the reference
//! (lower resolution) dataset.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use super::error::TableResult;
use super::offsets::{Offset, OffsetTable};
use crate::CanonicalName;

#[derive(Debug, Deserialize)]
struct AlignmentRow {
    defname: String,
    imagename: String,
    group: u32,
    frame: u32,
    left_margin: i32,
    top_margin: i32,
    full_width: u32,
    full_height: u32,
}

/// Placement of one frame in reference-resolution units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    /// Canonical image (frame) name
    pub image_name: CanonicalName,
    /// Animation group index inside the def
    pub group: u32,
    /// Frame index inside the animation group
    pub frame: u32,
    /// Distance from the full frame's left edge to the image
    pub left_margin: i32,
    /// Distance from the full frame's top edge to the image
    pub top_margin: i32,
    /// Full frame width
    pub full_width: u32,
    /// Full frame height
    pub full_height: u32,
    /// Correction from the offset table, if any
    pub offset: Option<Offset>,
}

impl AlignmentRecord {
    /// Paste position at `factor` magnification, offset correction included
    pub fn paste_origin(&self, factor: u32) -> (i64, i64) {
        let offset = self.offset.unwrap_or_default();
        let factor = i64::from(factor);
        (
            (i64::from(self.left_margin) - i64::from(offset.dx)) * factor,
            (i64::from(self.top_margin) - i64::from(offset.dy)) * factor,
        )
    }
}

/// All rows of one def
#[derive(Debug, Clone, Default)]
pub struct GroupAlignment {
    rows: Vec<AlignmentRecord>,
    index: HashMap<CanonicalName, usize>,
    max_full_width: u32,
    max_full_height: u32,
}

impl GroupAlignment {
    fn push(&mut self, record: AlignmentRecord) {
        self.max_full_width = self.max_full_width.max(record.full_width);
        self.max_full_height = self.max_full_height.max(record.full_height);
        // First row wins for lookups, every row stays in the manifest order
        self.index
            .entry(record.image_name.clone())
            .or_insert(self.rows.len());
        self.rows.push(record);
    }

    /// Record for an image name
    pub fn get(&self, image_name: &str) -> Option<&AlignmentRecord> {
        self.index.get(image_name).map(|&i| &self.rows[i])
    }

    /// Rows in table order
    pub fn rows(&self) -> &[AlignmentRecord] {
        &self.rows
    }

    /// Canvas size at `factor` magnification
    pub fn canvas_size(&self, factor: u32) -> (u32, u32) {
        (self.max_full_width * factor, self.max_full_height * factor)
    }

    /// Widest full frame in reference units
    pub fn max_full_width(&self) -> u32 {
        self.max_full_width
    }

    /// Tallest full frame in reference units
    pub fn max_full_height(&self) -> u32 {
        self.max_full_height
    }
}

/// Alignment rows keyed by def
#[derive(Debug, Clone, Default)]
pub struct AlignmentTable {
    groups: BTreeMap<CanonicalName, GroupAlignment>,
}

impl AlignmentTable {
    /// Parse a semicolon separated table with a header row
    pub fn from_reader<R: Read>(reader: R) -> TableResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::default();
        let mut rows = 0usize;
        for result in csv_reader.deserialize::<AlignmentRow>() {
            let row = result?;
            table.insert(
                CanonicalName::new(&row.defname),
                AlignmentRecord {
                    image_name: CanonicalName::new(&row.imagename),
                    group: row.group,
                    frame: row.frame,
                    left_margin: row.left_margin,
                    top_margin: row.top_margin,
                    full_width: row.full_width,
                    full_height: row.full_height,
                    offset: None,
                },
            );
            rows += 1;
        }

        debug!("Loaded {} alignment rows across {} defs", rows, table.groups.len());
        Ok(table)
    }

    /// Add a row to a def
    pub fn insert(&mut self, def: CanonicalName, record: AlignmentRecord) {
        self.groups.entry(def).or_default().push(record);
    }

    /// Attach offset corrections; returns how many matched a row
    pub fn apply_offsets(&mut self, offsets: &OffsetTable) -> usize {
        let mut matched = 0;
        for (def, image, offset) in offsets.iter() {
            if let Some(group) = self.groups.get_mut(def.as_str()) {
                for row in group.rows.iter_mut().filter(|r| &r.image_name == image) {
                    row.offset = Some(offset);
                    matched += 1;
                }
            }
        }
        matched
    }

    /// Rows of one def
    pub fn group(&self, def: &str) -> Option<&GroupAlignment> {
        self.groups.get(def)
    }

    /// Defs in sorted order
    pub fn groups(&self) -> impl Iterator<Item = (&CanonicalName, &GroupAlignment)> {
        self.groups.iter()
    }

    /// Number of defs
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no rows were loaded
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tables::TableError;

    const TABLE: &str = "\
defname;imagename;group;frame;left_margin;top_margin;full_width;full_height
CBASIL;CbasilA1;0;0;10;5;40;30
cbasil;CBASILA2;0;1;12;6;80;35
AVXMAGE;MAGE01;0;0;1;2;20;20
";

    #[test]
    fn test_groups_by_def() {
        let table = AlignmentTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let basilisk = table.group("CBASIL").unwrap();
        assert_eq!(basilisk.rows().len(), 2);
        assert_eq!(basilisk.max_full_width(), 80);
        assert_eq!(basilisk.max_full_height(), 35);
        assert_eq!(basilisk.canvas_size(2), (160, 70));
        assert_eq!(basilisk.get("CBASILA1").unwrap().left_margin, 10);
    }

    #[test]
    fn test_column_order_is_free() {
        let text = "imagename;defname;frame;group;full_height;full_width;top_margin;left_margin\nA;D;3;1;9;8;7;6\n";
        let table = AlignmentTable::from_reader(text.as_bytes()).unwrap();
        let record = table.group("D").unwrap().get("A").unwrap();
        assert_eq!((record.group, record.frame), (1, 3));
        assert_eq!((record.left_margin, record.top_margin), (6, 7));
        assert_eq!((record.full_width, record.full_height), (8, 9));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let text = "defname;imagename;group;frame\nD;A;0;0\n";
        let err = AlignmentTable::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::Csv(_)));
    }

    #[test]
    fn test_offsets_shift_paste_origin() {
        let mut table = AlignmentTable::from_reader(TABLE.as_bytes()).unwrap();
        let offsets = OffsetTable::parse("CBASIL CBASILA1 3 -2\nNOPE X 1 1\n").unwrap();
        assert_eq!(table.apply_offsets(&offsets), 1);

        let group = table.group("CBASIL").unwrap();
        assert_eq!(group.get("CBASILA1").unwrap().paste_origin(2), (14, 14));
        assert_eq!(group.get("CBASILA2").unwrap().paste_origin(3), (36, 18));
    }
}
