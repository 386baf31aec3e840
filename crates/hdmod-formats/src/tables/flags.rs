//! Flag anchor positions
//!
//! One frame per line: `frameName anchorCount (variant x y)*`. Coordinates
//! are in reference-resolution units. Blank lines and `#` comments are
//! ignored.

use std::collections::BTreeMap;

use super::error::{TableError, TableResult};
use crate::CanonicalName;

/// Where one flag is drawn on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagAnchor {
    /// Which flag bitmap to draw (`0` left, `1` right)
    pub variant: u32,
    /// Horizontal position
    pub x: i32,
    /// Vertical position
    pub y: i32,
}

/// Flag anchors of a frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSpec {
    /// Anchors in table order
    pub anchors: Vec<FlagAnchor>,
}

/// Flag anchors keyed by frame name
#[derive(Debug, Clone, Default)]
pub struct FlagTable {
    frames: BTreeMap<CanonicalName, FlagSpec>,
}

impl FlagTable {
    /// Parse flag table text
    pub fn parse(text: &str) -> TableResult<Self> {
        let mut table = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            if raw.trim_start().starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = raw.split_ascii_whitespace().collect();
            let [name, count, rest @ ..] = fields.as_slice() else {
                if fields.is_empty() {
                    continue;
                }
                return Err(TableError::invalid(line_no, "expected frame name and anchor count"));
            };

            let count: usize = count
                .parse()
                .map_err(|_| TableError::invalid(line_no, format!("invalid anchor count '{count}'")))?;
            if count.checked_mul(3) != Some(rest.len()) {
                return Err(TableError::invalid(
                    line_no,
                    format!("{count} anchors declared but {} values present", rest.len()),
                ));
            }

            let mut anchors = Vec::with_capacity(count);
            for triple in rest.chunks_exact(3) {
                let number = |raw: &str| {
                    raw.parse::<i32>()
                        .map_err(|_| TableError::invalid(line_no, format!("invalid anchor value '{raw}'")))
                };
                let variant = triple[0]
                    .parse::<u32>()
                    .map_err(|_| TableError::invalid(line_no, format!("invalid variant '{}'", triple[0])))?;
                anchors.push(FlagAnchor {
                    variant,
                    x: number(triple[1])?,
                    y: number(triple[2])?,
                });
            }

            table.frames.insert(CanonicalName::new(name), FlagSpec { anchors });
        }

        Ok(table)
    }

    /// Anchors for a frame
    pub fn get(&self, frame: &str) -> Option<&FlagSpec> {
        self.frames.get(frame)
    }

    /// Number of frames with anchors
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frames were loaded
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_anchors() {
        let table = FlagTable::parse("# frame count anchors\navwmine0 2 0 10 20 1 30 -4\n\nAVXSAWM0 0\n").unwrap();
        assert_eq!(table.len(), 2);

        let mine = table.get("AVWMINE0").unwrap();
        assert_eq!(
            mine.anchors,
            vec![
                FlagAnchor { variant: 0, x: 10, y: 20 },
                FlagAnchor { variant: 1, x: 30, y: -4 },
            ]
        );
        assert!(table.get("AVXSAWM0").unwrap().anchors.is_empty());
    }

    #[test]
    fn test_count_mismatch() {
        let err = FlagTable::parse("A 0\nB 2 0 1 1\n").unwrap_err();
        assert!(matches!(err, TableError::Invalid { line: 2, .. }));
    }

    #[test]
    fn test_huge_count_is_rejected() {
        let text = format!("A {} 0 1 1\n", usize::MAX);
        let err = FlagTable::parse(&text).unwrap_err();
        assert!(matches!(err, TableError::Invalid { line: 1, .. }));

        let third = usize::MAX / 3 + 1;
        let err = FlagTable::parse(&format!("A {third}\n")).unwrap_err();
        assert!(err.to_string().contains("anchors declared but 0 values present"));
    }

    #[test]
    fn test_missing_count() {
        let err = FlagTable::parse("LONELY\n").unwrap_err();
        assert!(matches!(err, TableError::Invalid { line: 1, .. }));
    }
}
