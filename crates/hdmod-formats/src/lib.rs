//! Parsers for the asset containers shipped with the HD edition
//!
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Many archive-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
//! This crate holds everything needed to turn a `.pak` archive into raw
//! image payloads plus structured frame-extraction instructions, and to load
//! the static reference tables that later stages consult.
//!
//! # Supported Formats
//!
//! - **PAK**: entry table, chunk size lists and mixed stored/zlib payloads
//! - **Directive**: the per-entry text that describes frame crops, rotations
//!   and shadow sub-rects
//! - **Reference tables**: sprite alignment CSV, offset corrections and flag
//!   anchor placement
//!
//! # Design Principles
//!
//! - **Lazy archives**: entries are decoded one at a time; the archive is
//!   never held in memory as a whole
//! - **Canonical names**: frame and group identifiers are uppercased exactly
//!   once, at ingestion, and used as keys everywhere downstream
//! - **Recoverable vs fatal**: bad header offsets abort an archive, a bad
//!   directive line or a partial inflate never does

#![warn(missing_docs)]

/// Frame directive text parsing
///
/// Each archive entry starts with a block of `\r\n` separated lines. Every
/// line names one frame, the payload image it is cut from, the crop rect,
/// a quarter-turn rotation and an optional shadow sub-rect.
///
/// See the [`directive`] module for the line grammar.
pub mod directive;
mod locale;
mod name;
/// PAK container parsing and chunk decoding
///
/// Key features:
/// - **Entry table**: fixed little-endian records with per-chunk size lists
/// - **Mixed chunks**: stored chunks are copied, compressed chunks are
///   concatenated and inflated as a series of independent zlib streams
/// - **Fail closed**: a stalled inflate reports what decoded so far instead
///   of guessing
///
/// See the [`pak`] module for the byte layout.
pub mod pak;
mod scale;
/// Static reference tables loaded once per run
pub mod tables;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use locale::{Locale, UnknownLocale};
pub use name::CanonicalName;
pub use scale::{InvalidScale, Scale};
