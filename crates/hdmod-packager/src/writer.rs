//! Mod tree writer
//!
//! Layout under the output directory:
//!
//! ```text
//! hd_version/
//!   mod.json
//!   mods/x<scale>/mod.json
//!   mods/x<scale>/content.zip
//!   mods/x<scale>_translation_<language code>/mod.json
//!   mods/x<scale>_translation_<language code>/content.zip
//! ```
//!
//! Every file of a scale is first written to a temporary file next to its
//! destination. Only when all of them are complete are they renamed into
//! place, so an aborted or failed scale leaves the previous output intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hdmod_formats::{Locale, Scale};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::bundle::ModBundle;
use crate::descriptor::ModDescriptor;
use crate::error::{PackageError, PackageResult};
use crate::json::to_json_pretty;

/// Root directory name of the generated mod
pub const MOD_DIR: &str = "hd_version";
/// Descriptor file name
pub const DESCRIPTOR_FILE: &str = "mod.json";
/// Bundle archive file name
pub const CONTENT_FILE: &str = "content.zip";

struct Staged {
    temp: NamedTempFile,
    dest: PathBuf,
}

/// Writes bundles and descriptors for one locale
#[derive(Debug, Clone)]
pub struct ModPackager {
    root: PathBuf,
    locale: Locale,
}

impl ModPackager {
    /// Packager writing below `output`
    ///
    /// The locale code is resolved here, before anything touches disk.
    pub fn new(output: &Path, locale_code: &str) -> PackageResult<Self> {
        let locale = Locale::from_code(locale_code)?;
        Ok(Self {
            root: output.join(MOD_DIR),
            locale,
        })
    }

    /// `<output>/hd_version`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved locale
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Directory of the language-independent mod of a scale
    pub fn scale_dir(&self, scale: Scale) -> PathBuf {
        self.root.join("mods").join(format!("x{scale}"))
    }

    /// Directory of the translation mod of a scale
    pub fn translation_dir(&self, scale: Scale) -> PathBuf {
        self.root.join("mods").join(format!(
            "x{scale}_translation_{}",
            self.locale.code().to_ascii_lowercase()
        ))
    }

    /// Write both mods of a scale plus the aggregate descriptor
    ///
    /// `aborted` is polled once everything is staged; when it returns true
    /// the staged files are discarded and [`PackageError::Aborted`] is
    /// returned. Returns the finalized paths in the order they were moved
    /// into place.
    ///
    /// Archives are finalized before descriptors and the aggregate
    /// descriptor goes last, so a mod directory never carries a `mod.json`
    /// without its content. If a move fails, the files this call already
    /// finalized are removed again.
    pub fn write_scale<F>(
        &self,
        scale: Scale,
        common: &ModBundle,
        localized: &ModBundle,
        aborted: F,
    ) -> PackageResult<Vec<PathBuf>>
    where
        F: Fn() -> bool,
    {
        let main_dir = self.scale_dir(scale);
        let translation_dir = self.translation_dir(scale);
        for dir in [&self.root, &main_dir, &translation_dir] {
            fs::create_dir_all(dir).map_err(|e| PackageError::io(dir.as_path(), e))?;
        }

        let staged = vec![
            stage_zip(&main_dir, common)?,
            stage_zip(&translation_dir, localized)?,
            stage_json(&main_dir, &ModDescriptor::for_scale(scale))?,
            stage_json(&translation_dir, &ModDescriptor::for_translation(scale, self.locale))?,
            stage_json(&self.root, &ModDescriptor::aggregate())?,
        ];

        if aborted() {
            debug!("x{scale}: discarding {} staged files", staged.len());
            return Err(PackageError::Aborted);
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for Staged { temp, dest } in staged {
            if let Err(e) = temp.persist(&dest) {
                warn!("x{scale}: rolling back {} finalized files", written.len());
                for path in &written {
                    if let Err(remove) = fs::remove_file(path) {
                        warn!("failed to remove {}: {remove}", path.display());
                    }
                }
                return Err(PackageError::Persist {
                    path: dest,
                    source: e.error,
                });
            }
            written.push(dest);
        }

        info!(
            "x{scale}: wrote {} common and {} localized files",
            common.files().len(),
            localized.files().len()
        );
        Ok(written)
    }
}

fn temp_in(dir: &Path) -> PackageResult<NamedTempFile> {
    NamedTempFile::new_in(dir).map_err(|e| PackageError::io(dir, e))
}

fn stage_json<T: serde::Serialize>(dir: &Path, value: &T) -> PackageResult<Staged> {
    let mut temp = temp_in(dir)?;
    temp.write_all(&to_json_pretty(value)?)
        .map_err(|e| PackageError::io(temp.path(), e))?;
    Ok(Staged {
        temp,
        dest: dir.join(DESCRIPTOR_FILE),
    })
}

fn stage_zip(dir: &Path, bundle: &ModBundle) -> PackageResult<Staged> {
    let temp = temp_in(dir)?;
    let temp_path = temp.path().to_path_buf();
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut writer = ZipWriter::new(temp);
    for (path, bytes) in bundle.files() {
        writer.start_file(path.as_str(), options)?;
        writer
            .write_all(bytes)
            .map_err(|e| PackageError::io(&temp_path, e))?;
    }
    let temp = writer.finish()?;

    Ok(Staged {
        temp,
        dest: dir.join(CONTENT_FILE),
    })
}
