//! Run configuration.
//!
//! Settings come from CLI arguments with environment fallbacks:
//! - `--input` / `HDMOD_INPUT`: HD edition install directory (holds `data/`)
//! - `--output` / `HDMOD_OUTPUT`: directory receiving `hd_version/`
//! - `--reference` / `HDMOD_REFERENCE`: reference tables and flag bitmaps
//! - `--scales` / `HDMOD_SCALES`: comma separated, `2,3` by default
//! - `--threads` / `HDMOD_THREADS`: worker count, `0` for one per core
//!
//! Library callers can build a [`RunConfig`] with [`RunConfig::new`] and
//! adjust the public fields instead of going through clap.

use std::path::{Path, PathBuf};

use clap::Parser;
use hdmod_formats::Scale;
use hdmod_formats::pak::SelectionPolicy;
use hdmod_formats::tables::ALIGNMENT_FILE;
use hdmod_sprites::overlay::DEFAULT_CREATURE_PREFIXES;

use crate::error::ConfigError;

/// Upper bound for `--threads`
pub const MAX_THREADS: usize = 256;

/// Conversion settings.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hdmod",
    about = "Convert Heroes III HD edition archives into a VCMI mod",
    version
)]
pub struct RunConfig {
    /// HD edition install directory
    #[arg(long, short, env = "HDMOD_INPUT")]
    pub input: PathBuf,

    /// Output directory
    #[arg(long, short, env = "HDMOD_OUTPUT", default_value = ".")]
    pub output: PathBuf,

    /// Directory with `sd_lod_sprites.csv` and the other reference files
    #[arg(long, short, env = "HDMOD_REFERENCE", default_value = "./reference")]
    pub reference: PathBuf,

    /// Scales to convert
    #[arg(
        long,
        env = "HDMOD_SCALES",
        value_delimiter = ',',
        default_value = "2,3"
    )]
    pub scales: Vec<Scale>,

    /// Worker threads, 0 for one per core
    #[arg(long, short = 'j', env = "HDMOD_THREADS", default_value_t = 0)]
    pub threads: usize,

    /// Locale code overriding the discovered `LOC` directory
    #[arg(long, env = "HDMOD_LOCALE")]
    pub locale: Option<String>,

    /// Trust per-chunk flags instead of the longest-buffer rule
    #[arg(long, env = "HDMOD_CHUNK_FLAGS")]
    pub chunk_flags: bool,

    /// Frame name prefixes that receive outline overlays
    #[arg(
        long,
        env = "HDMOD_CREATURE_PREFIXES",
        value_delimiter = ',',
        default_values_t = DEFAULT_CREATURE_PREFIXES.map(String::from)
    )]
    pub creature_prefixes: Vec<String>,

    /// Write each entry's first raw payload as `<id>.dds` here
    #[arg(long, env = "HDMOD_DUMP_RAW")]
    pub dump_raw: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, env = "HDMOD_LOG_JSON")]
    pub log_json: bool,
}

impl RunConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Configuration with defaults for everything but the paths.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, reference: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            reference: reference.into(),
            scales: Scale::ALL.to_vec(),
            threads: 0,
            locale: None,
            chunk_flags: false,
            creature_prefixes: DEFAULT_CREATURE_PREFIXES.map(String::from).to_vec(),
            dump_raw: None,
            log_json: false,
        }
    }

    /// `<input>/data`
    pub fn data_dir(&self) -> PathBuf {
        self.input.join("data")
    }

    /// Chunk selection policy for archive readers.
    pub const fn selection_policy(&self) -> SelectionPolicy {
        if self.chunk_flags {
            SelectionPolicy::ChunkFlags
        } else {
            SelectionPolicy::LongestWins
        }
    }

    /// Requested scales, deduplicated and sorted.
    pub fn unique_scales(&self) -> Vec<Scale> {
        let mut scales = self.scales.clone();
        scales.sort_unstable();
        scales.dedup();
        scales
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The input has no `data` directory
    /// - The reference directory has no alignment table
    /// - No scale is selected or the thread count is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_dir(&self.data_dir())?;

        let alignment = self.reference.join(ALIGNMENT_FILE);
        if !alignment.is_file() {
            return Err(ConfigError::MissingRequired(format!(
                "alignment table not found: {}",
                alignment.display()
            )));
        }

        if self.scales.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scales",
                reason: "at least one scale is required".to_string(),
            });
        }

        if self.threads > MAX_THREADS {
            return Err(ConfigError::InvalidValue {
                field: "threads",
                reason: format!("{} exceeds the limit of {MAX_THREADS}", self.threads),
            });
        }

        if let Some(dump) = &self.dump_raw {
            if dump.is_file() {
                return Err(ConfigError::InvalidValue {
                    field: "dump-raw",
                    reason: format!("{} is a file", dump.display()),
                });
            }
        }

        Ok(())
    }
}

fn require_dir(path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::MissingRequired(format!(
            "directory not found: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, RunConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("game/data")).unwrap();
        std::fs::create_dir_all(dir.path().join("reference")).unwrap();
        std::fs::write(dir.path().join("reference").join(ALIGNMENT_FILE), "").unwrap();
        let config = RunConfig::new(
            dir.path().join("game"),
            dir.path().join("out"),
            dir.path().join("reference"),
        );
        (dir, config)
    }

    #[test]
    fn test_parse_args() {
        let config = RunConfig::try_parse_from([
            "hdmod",
            "--input",
            "/games/h3",
            "--scales",
            "x3,2",
            "-j",
            "4",
            "--creature-prefixes",
            "CB,CG",
        ])
        .unwrap();

        assert_eq!(config.input, PathBuf::from("/games/h3"));
        assert_eq!(config.unique_scales(), vec![Scale::X2, Scale::X3]);
        assert_eq!(config.threads, 4);
        assert_eq!(config.creature_prefixes, vec!["CB", "CG"]);
        assert_eq!(config.selection_policy(), SelectionPolicy::LongestWins);
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(RunConfig::try_parse_from(["hdmod", "--input", "x", "--scales", "4"]).is_err());
    }

    #[test]
    fn test_validate() {
        let (_dir, mut config) = workspace();
        config.validate().unwrap();

        config.threads = MAX_THREADS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "threads", .. })
        ));

        config.threads = 0;
        config.scales.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_missing_data() {
        let (dir, mut config) = workspace();
        config.input = dir.path().join("nowhere");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}
