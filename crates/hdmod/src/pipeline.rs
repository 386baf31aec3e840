//! Conversion pipeline
//!
//! Per scale, archives are read sequentially and their entries decoded in
//! batches on a rayon pool. Each entry becomes a small [`ModBundle`] on its
//! worker (frames cut, aligned, overlaid and PNG encoded); the main thread
//! merges those in archive order into the scale's common and localized
//! bundles, which sort their members, so scheduling never changes the
//! output.

use std::fs;
use std::path::Path;

use hdmod_formats::directive::parse_directive;
use hdmod_formats::pak::{DecodedEntry, PakError, PakReader};
use hdmod_formats::tables::ReferenceTables;
use hdmod_formats::{Locale, Scale};
use hdmod_packager::{BundleKey, ModBundle, ModPackager, PackageError};
use hdmod_sprites::overlay::{FLAG_LEFT_FILE, FLAG_RIGHT_FILE};
use hdmod_sprites::{
    FlagBitmaps, OverlayCompositor, PayloadImages, SpriteAligner, reconstruct_entry,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::control::{RunControl, Stage};
use crate::discovery::{ArchiveSet, ArchiveSource, AssetCategory};
use crate::error::{PipelineError, PipelineResult};
use crate::report::{Issue, IssueKind, PassReport, RunSummary};

/// Entries decoded before a batch is handed to the pool
pub const BATCH_SIZE: usize = 64;

/// Read-only inputs shared by every pass
#[derive(Debug)]
pub struct ReferenceData {
    /// Alignment, offset and flag tables
    pub tables: ReferenceTables,
    /// Flag pole bitmaps, when present
    pub flag_bitmaps: Option<FlagBitmaps>,
}

impl ReferenceData {
    /// Load tables and flag bitmaps from `dir`
    ///
    /// Flag bitmaps are optional; without them no flag overlays are made.
    pub fn load(dir: &Path) -> PipelineResult<Self> {
        let tables = ReferenceTables::load(dir)?;
        let flag_bitmaps = if dir.join(FLAG_LEFT_FILE).is_file() && dir.join(FLAG_RIGHT_FILE).is_file() {
            Some(FlagBitmaps::load(dir)?)
        } else {
            warn!(
                "Flag bitmaps not found in {}, flag overlays disabled",
                dir.display()
            );
            None
        };
        Ok(Self {
            tables,
            flag_bitmaps,
        })
    }
}

/// Per-pass stage setup shared by the workers
struct PassContext<'a> {
    scale: Scale,
    aligner: SpriteAligner<'a>,
    compositor: OverlayCompositor<'a>,
    data: &'a ReferenceData,
    dump_dir: Option<&'a Path>,
}

/// What one entry contributed
struct EntryOutput {
    bundle: ModBundle,
    issues: Vec<IssueKind>,
}

/// Bundles and bookkeeping of the pass in progress
struct PassState {
    report: PassReport,
    common: ModBundle,
    localized: ModBundle,
}

impl PassState {
    fn new(scale: Scale) -> Self {
        Self {
            report: PassReport::new(scale),
            common: ModBundle::new(BundleKey {
                scale,
                localized: false,
            }),
            localized: ModBundle::new(BundleKey {
                scale,
                localized: true,
            }),
        }
    }

    fn issue(&mut self, archive: &str, entry: &str, kind: IssueKind) {
        warn!("{archive}:{entry}: {kind}");
        self.report.issues.push(Issue {
            archive: archive.to_string(),
            entry: entry.to_string(),
            kind,
        });
    }
}

/// Runs conversions
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    data: &'a ReferenceData,
    control: &'a RunControl,
}

impl<'a> Pipeline<'a> {
    /// Pipeline over validated configuration and loaded reference data
    pub const fn new(config: &'a RunConfig, data: &'a ReferenceData, control: &'a RunControl) -> Self {
        Self {
            config,
            data,
            control,
        }
    }

    /// Convert every requested scale
    ///
    /// # Errors
    ///
    /// Fails on an unknown or missing locale (before anything is written),
    /// on filesystem or packaging failures and when the run is cancelled.
    /// A malformed archive only aborts its own scale and is recorded in the
    /// returned summary.
    pub fn run(config: &RunConfig, data: &ReferenceData, control: &RunControl) -> PipelineResult<RunSummary> {
        Pipeline::new(config, data, control).execute()
    }

    fn execute(&self) -> PipelineResult<RunSummary> {
        let data_dir = self.config.data_dir();
        let archives = ArchiveSet::discover(&data_dir)?;

        let code = self
            .config
            .locale
            .clone()
            .or_else(|| archives.locale_code.clone())
            .ok_or_else(|| PipelineError::NoLocale {
                path: data_dir.join(crate::discovery::LOCALIZED_DIR),
            })?;
        let locale = Locale::from_code(&code)?;
        let packager = ModPackager::new(&self.config.output, locale.code())?;
        info!("Locale {} ({})", locale.code(), locale.language());

        if let Some(dump) = &self.config.dump_raw {
            fs::create_dir_all(dump).map_err(|e| PipelineError::io(dump, e))?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;
        debug!("Worker pool with {} threads", pool.current_num_threads());

        let mut summary = RunSummary {
            locale: locale.code().to_string(),
            passes: Vec::new(),
            written: Vec::new(),
        };

        for scale in self.config.unique_scales() {
            let sources: Vec<_> = archives.archives_for(scale).collect();
            info!("x{scale}: {} archives", sources.len());

            let state = self.extract_pass(scale, &sources, &pool)?;
            let mut report = state.report;

            if report.aborted.is_some() {
                summary.passes.push(report);
                continue;
            }

            self.check_cancelled()?;
            self.control.report(Stage::Package, 0, 1);
            let written = packager
                .write_scale(scale, &state.common, &state.localized, || {
                    self.control.is_cancelled()
                })
                .map_err(|e| match e {
                    PackageError::Aborted => PipelineError::Cancelled,
                    other => PipelineError::Package(other),
                })?;
            self.control.report(Stage::Package, 1, 1);

            report.bitmaps = state.common.bitmap_count() + state.localized.bitmap_count();
            report.groups = state.common.group_count() + state.localized.group_count();
            info!(
                "x{scale}: {} entries, {} bitmaps, {} sprite groups, {} issues",
                report.entries,
                report.bitmaps,
                report.groups,
                report.issues.len()
            );
            summary.written.extend(written);
            summary.passes.push(report);
        }

        Ok(summary)
    }

    fn check_cancelled(&self) -> PipelineResult<()> {
        if self.control.is_cancelled() {
            info!("Cancellation requested");
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn extract_pass(
        &self,
        scale: Scale,
        sources: &[&ArchiveSource],
        pool: &rayon::ThreadPool,
    ) -> PipelineResult<PassState> {
        let compositor = OverlayCompositor::new(&self.data.tables.flags, self.data.flag_bitmaps.as_ref(), scale)
            .with_creature_prefixes(&self.config.creature_prefixes);
        let context = PassContext {
            scale,
            aligner: SpriteAligner::new(&self.data.tables.alignment, scale),
            compositor,
            data: self.data,
            dump_dir: self.config.dump_raw.as_deref(),
        };

        let mut state = PassState::new(scale);
        for source in sources {
            self.check_cancelled()?;
            if let Err(e) = self.extract_archive(source, &context, pool, &mut state) {
                match e {
                    ArchiveFailure::Malformed(reason) => {
                        warn!(
                            "x{scale}: {} is malformed, pass aborted: {reason}",
                            source.file_name()
                        );
                        state.report.aborted = Some(format!("{}: {reason}", source.file_name()));
                        return Ok(state);
                    }
                    ArchiveFailure::Fatal(e) => return Err(e),
                }
            }
            state.report.archives += 1;
        }
        Ok(state)
    }

    fn extract_archive(
        &self,
        source: &ArchiveSource,
        context: &PassContext<'_>,
        pool: &rayon::ThreadPool,
        state: &mut PassState,
    ) -> Result<(), ArchiveFailure> {
        let archive = source.file_name();
        let failure = |e: PakError| ArchiveFailure::new(e, &source.path);
        let mut reader = PakReader::open(&source.path)
            .map_err(failure)?
            .with_policy(self.config.selection_policy());
        let total = reader.entry_count() as usize;
        debug!("{archive}: {total} entries ({:?})", source.category);

        let mut done = 0;
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        let mut entries = reader.entries();
        loop {
            let next = entries.next();
            let finished = next.is_none();
            match next {
                Some(Ok(entry)) => batch.push(entry),
                Some(Err(PakError::Entry { id, source: e })) => {
                    state.issue(&archive, &id, IssueKind::EntrySkipped { reason: e.to_string() });
                }
                Some(Err(e)) => return Err(failure(e)),
                None => {}
            }

            if batch.len() >= BATCH_SIZE || (finished && !batch.is_empty()) {
                self.check_cancelled().map_err(ArchiveFailure::Fatal)?;
                let outputs: Vec<(String, PipelineResult<EntryOutput>)> = pool.install(|| {
                    batch
                        .par_iter()
                        .map(|entry| {
                            (
                                entry.entry.id.clone(),
                                process_entry(entry, source.category, context),
                            )
                        })
                        .collect()
                });
                done += batch.len();
                batch.clear();

                for (id, output) in outputs {
                    let output = output.map_err(ArchiveFailure::Fatal)?;
                    for kind in output.issues {
                        state.issue(&archive, &id, kind);
                    }
                    if source.category.is_localized() {
                        state.localized.merge(output.bundle);
                    } else {
                        state.common.merge(output.bundle);
                    }
                }
                self.control.report(Stage::Extract, done, total);
            }

            if finished {
                break;
            }
        }
        state.report.entries += done;
        Ok(())
    }
}

/// Why an archive stopped early
enum ArchiveFailure {
    /// Header or offsets out of range; aborts the pass
    Malformed(String),
    /// Aborts the run
    Fatal(PipelineError),
}

impl ArchiveFailure {
    /// Filesystem errors end the run, everything else only the pass
    fn new(error: PakError, path: &Path) -> Self {
        match error {
            PakError::Io(e) => Self::Fatal(PipelineError::io(path, e)),
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Turn one decoded entry into its bundle contribution
fn process_entry(
    entry: &DecodedEntry,
    category: AssetCategory,
    context: &PassContext<'_>,
) -> PipelineResult<EntryOutput> {
    let group = entry.entry.name();
    let mut issues = Vec::new();
    let mut bundle = ModBundle::new(BundleKey {
        scale: context.scale,
        localized: category.is_localized(),
    });

    if let Some(exhausted) = &entry.exhausted {
        issues.push(IssueKind::from(exhausted));
    }

    if let (Some(dir), Some(first)) = (context.dump_dir, entry.images.first()) {
        let path = dir.join(format!("{}.dds", entry.entry.id));
        fs::write(&path, first).map_err(|e| PipelineError::io(&path, e))?;
    }

    let parsed = parse_directive(&entry.directive);
    issues.extend(parsed.errors.iter().map(IssueKind::from));
    if parsed.directives.is_empty() {
        issues.push(IssueKind::EntrySkipped {
            reason: "no frame directives".to_string(),
        });
        return Ok(EntryOutput { bundle, issues });
    }

    let images = PayloadImages::decode(group.as_str(), &entry.images);
    let referenced: Vec<usize> = parsed
        .directives
        .iter()
        .flat_map(|d| std::iter::once(d.image_index).chain(d.shadow.map(|s| s.image_index)))
        .collect();
    issues.extend(
        images
            .undecodable()
            .filter(|index| !referenced.contains(index))
            .map(|index| IssueKind::UndecodableImage { frame: None, index }),
    );

    let mut reconstructed = reconstruct_entry(&group, &images, &parsed.directives);
    issues.extend(reconstructed.errors.iter().map(IssueKind::from));

    if category.is_sprite() {
        let aligned = context
            .aligner
            .align_group(group.as_str(), &mut reconstructed.frames);
        debug!("{group}: {aligned} of {} frames aligned", reconstructed.frames.len());
        let overlays = context.compositor.compose_all(&reconstructed.frames);
        if let Err(e) = bundle.add_sprite_group(
            &group,
            &reconstructed.frames,
            &overlays,
            context.data.tables.alignment.group(group.as_str()),
        ) {
            // Drop whatever part of the group made it in
            warn!("{group}: group not packaged: {e}");
            bundle = ModBundle::new(bundle.key());
            issues.push(IssueKind::EntrySkipped { reason: e.to_string() });
        }
    } else {
        for frame in &reconstructed.frames {
            if let Err(e) = bundle.add_bitmap(frame) {
                warn!("{group}: bitmap {} not packaged: {e}", frame.name);
                issues.push(IssueKind::FrameSkipped {
                    frame: frame.name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(EntryOutput { bundle, issues })
}
