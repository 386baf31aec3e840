//! VCMI mod packaging for extracted HD edition assets
//!
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! Collects frames, overlays and bitmaps into [`ModBundle`]s (one per
//! scale and language-independent/localized split), then writes them with
//! their `mod.json` descriptors through [`ModPackager`].
//!
//! Output is deterministic: archive members are written in sorted order
//! with a fixed timestamp and JSON is always indented by four spaces, so
//! identical inputs give byte-identical mods.

#![warn(missing_docs)]

mod bundle;
mod descriptor;
mod error;
mod json;
mod manifest;
mod writer;

pub use bundle::{BITMAP_EXCLUSIONS, BundleKey, ModBundle};
pub use descriptor::ModDescriptor;
pub use error::{PackageError, PackageResult};
pub use json::to_json_pretty;
pub use manifest::{AnimationManifest, ManifestImage};
pub use writer::{CONTENT_FILE, DESCRIPTOR_FILE, MOD_DIR, ModPackager};
