//! HD edition to VCMI mod converter.
//!
//! This crate drives the whole conversion:
//! - `config`: CLI/environment settings and validation
//! - `discovery`: finding archives and classifying them
//! - `pipeline`: decode, reconstruct, align, overlay and package per scale
//! - `control`: cancellation and progress hooks
//! - `report`: recoverable issues collected per pass
//!
//! # Example
//!
//! ```no_run
//! use hdmod::{Pipeline, ReferenceData, RunConfig, RunControl};
//!
//! fn main() -> anyhow::Result<()> {
//!     tracing_subscriber::fmt::init();
//!
//!     let config = RunConfig::from_args();
//!     config.validate()?;
//!
//!     let data = ReferenceData::load(&config.reference)?;
//!     let summary = Pipeline::run(&config, &data, &RunControl::new())?;
//!     println!("{} files written", summary.written.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod control;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::RunConfig;
pub use control::{CancelFlag, Progress, RunControl, Stage};
pub use discovery::{ArchiveSet, ArchiveSource, AssetCategory};
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{Pipeline, ReferenceData};
pub use report::{Issue, IssueKind, PassReport, RunSummary};
