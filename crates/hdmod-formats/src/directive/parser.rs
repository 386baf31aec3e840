//! Directive text parser

use std::str::FromStr;

use super::error::DirectiveError;
use super::{CropRect, ImageDirective, Rotation, ShadowDirective};
use crate::CanonicalName;

/// Fields in a line without shadow data
pub const MIN_FIELDS: usize = 12;

/// Extra fields a shadowed line carries
pub const SHADOW_FIELDS: usize = 6;

/// Result of parsing a directive block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDirective {
    /// Frame instructions in line order
    pub directives: Vec<ImageDirective>,
    /// Lines that were skipped
    pub errors: Vec<DirectiveError>,
}

fn field<T: FromStr>(fields: &[&str], index: usize, name: &str, line: usize) -> Result<T, DirectiveError> {
    let raw = fields
        .get(index)
        .ok_or_else(|| DirectiveError::malformed(line, format!("missing field '{name}'")))?;
    raw.parse()
        .map_err(|_| DirectiveError::malformed(line, format!("invalid {name} '{raw}'")))
}

fn rotation(fields: &[&str], index: usize, name: &str, line: usize) -> Result<Rotation, DirectiveError> {
    let quadrant: u8 = field(fields, index, name, line)?;
    Rotation::from_quadrant(quadrant).ok_or_else(|| {
        DirectiveError::malformed(line, format!("{name} {quadrant} outside 0..=3"))
    })
}

/// Crop rect starting at `base` (x, y, width, height)
///
/// Zero-sized rects are rejected: a frame with no pixels cannot be encoded.
fn crop_rect(fields: &[&str], base: usize, prefix: &str, line: usize) -> Result<CropRect, DirectiveError> {
    let rect = CropRect {
        x: field(fields, base, &format!("{prefix}x"), line)?,
        y: field(fields, base + 1, &format!("{prefix}y"), line)?,
        width: field(fields, base + 2, &format!("{prefix}width"), line)?,
        height: field(fields, base + 3, &format!("{prefix}height"), line)?,
    };
    if rect.width == 0 || rect.height == 0 {
        return Err(DirectiveError::malformed(
            line,
            format!("empty {prefix}crop {}x{}", rect.width, rect.height),
        ));
    }
    Ok(rect)
}

fn parse_line(fields: &[&str], line: usize) -> Result<ImageDirective, DirectiveError> {
    let frame_name = CanonicalName::new(fields[0]);
    let image_index = field(fields, 1, "image index", line)?;
    let metadata = std::array::from_fn(|i| fields[2 + i].to_string());
    let rect = crop_rect(fields, 6, "", line)?;
    let primary_rotation = rotation(fields, 10, "rotation", line)?;
    let has_shadow: i64 = field(fields, 11, "shadow flag", line)?;

    let shadow = if has_shadow == 1 {
        if fields.len() < MIN_FIELDS + SHADOW_FIELDS {
            return Err(DirectiveError::malformed(
                line,
                format!(
                    "shadow flag set but only {} of {} fields present",
                    fields.len(),
                    MIN_FIELDS + SHADOW_FIELDS
                ),
            ));
        }
        Some(ShadowDirective {
            image_index: field(fields, 12, "shadow image index", line)?,
            rect: crop_rect(fields, 13, "shadow ", line)?,
            rotation: rotation(fields, 17, "shadow rotation", line)?,
        })
    } else {
        None
    };

    Ok(ImageDirective {
        frame_name,
        image_index,
        metadata,
        rect,
        rotation: primary_rotation,
        shadow,
    })
}

/// Parse a directive block
///
/// Lines with fewer than [`MIN_FIELDS`] fields are separators and skipped
/// silently. Lines that have enough fields but bad values are skipped and
/// reported in [`ParsedDirective::errors`].
pub fn parse_directive(text: &str) -> ParsedDirective {
    let mut parsed = ParsedDirective::default();

    for (index, raw) in text.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let fields: Vec<&str> = raw.split_ascii_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            continue;
        }

        match parse_line(&fields, index + 1) {
            Ok(directive) => parsed.directives.push(directive),
            Err(e) => parsed.errors.push(e),
        }
    }

    parsed
}
