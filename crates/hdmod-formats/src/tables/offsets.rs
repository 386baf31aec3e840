//! Per-frame offset corrections
//!
//! One correction per line: `entryId imagename dx dy`. Blank lines and
//! lines starting with `#` are ignored.

use std::collections::BTreeMap;

use super::error::{TableError, TableResult};
use crate::CanonicalName;

/// Correction subtracted from an alignment record's margins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    /// Horizontal correction
    pub dx: i32,
    /// Vertical correction
    pub dy: i32,
}

/// Offsets keyed by `(entry, image)`
#[derive(Debug, Clone, Default)]
pub struct OffsetTable {
    entries: BTreeMap<(CanonicalName, CanonicalName), Offset>,
}

impl OffsetTable {
    /// Parse offset table text
    pub fn parse(text: &str) -> TableResult<Self> {
        let mut table = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_ascii_whitespace().collect();
            let &[entry, image, dx, dy] = fields.as_slice() else {
                return Err(TableError::invalid(
                    index + 1,
                    format!("expected 4 fields, found {}", fields.len()),
                ));
            };

            let parse = |raw: &str, name: &str| {
                raw.parse::<i32>()
                    .map_err(|_| TableError::invalid(index + 1, format!("invalid {name} '{raw}'")))
            };
            let offset = Offset {
                dx: parse(dx, "dx")?,
                dy: parse(dy, "dy")?,
            };

            table
                .entries
                .insert((CanonicalName::new(entry), CanonicalName::new(image)), offset);
        }

        Ok(table)
    }

    /// Offset for an image of an entry
    pub fn get(&self, entry: &str, image: &str) -> Option<Offset> {
        self.entries
            .get(&(CanonicalName::new(entry), CanonicalName::new(image)))
            .copied()
    }

    /// All corrections in key order
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalName, &CanonicalName, Offset)> {
        self.entries
            .iter()
            .map(|((entry, image), offset)| (entry, image, *offset))
    }

    /// Number of corrections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no corrections were loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
