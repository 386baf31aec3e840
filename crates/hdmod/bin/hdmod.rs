//! hdmod binary entry point.
//!
//! Thin wrapper around the hdmod library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Loads the reference tables
//! 4. Runs the conversion and logs the summary

use anyhow::{Context, Result};
use hdmod::{Pipeline, ReferenceData, RunConfig, RunControl, Stage};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = RunConfig::from_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        "Converting {} into {} (scales {:?}, threads {})",
        config.input.display(),
        config.output.display(),
        config.unique_scales(),
        config.threads
    );

    config.validate()?;

    let data = ReferenceData::load(&config.reference)
        .with_context(|| format!("loading reference data from {}", config.reference.display()))?;

    let control = RunControl::new().with_progress(|progress| {
        if progress.stage == Stage::Package || progress.current == progress.total {
            tracing::debug!(
                "{}: {}/{}",
                progress.stage,
                progress.current,
                progress.total
            );
        }
    });

    let summary = Pipeline::run(&config, &data, &control)?;

    for pass in &summary.passes {
        match &pass.aborted {
            Some(reason) => tracing::error!("x{}: not packaged, {reason}", pass.scale),
            None => tracing::info!(
                "x{}: {} bitmaps, {} sprite groups, {} issues",
                pass.scale,
                pass.bitmaps,
                pass.groups,
                pass.issues.len()
            ),
        }
    }
    tracing::info!(
        "Done: {} files written for locale {}, {} issues",
        summary.written.len(),
        summary.locale,
        summary.issue_count()
    );

    if summary.aborted_passes().next().is_some() {
        anyhow::bail!("one or more scales were not packaged");
    }
    Ok(())
}
