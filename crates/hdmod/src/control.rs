//! Cancellation and progress reporting for long runs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag a caller sets to stop a run
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Pipeline stage a progress update refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading and decoding archive entries
    Extract,
    /// Writing the mod for one scale
    Package,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extract => write!(f, "extract"),
            Self::Package => write!(f, "package"),
        }
    }
}

/// Position within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Stage being run
    pub stage: Stage,
    /// Units finished so far
    pub current: usize,
    /// Units in the stage
    pub total: usize,
}

type ProgressFn = dyn Fn(Progress) + Send + Sync;

/// Caller hooks for a run
#[derive(Clone, Default)]
pub struct RunControl {
    cancel: Option<CancelFlag>,
    progress: Option<Arc<ProgressFn>>,
}

impl RunControl {
    /// No cancellation, no progress callback
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `flag` at archive, entry and group boundaries
    #[must_use]
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Call `callback` as work completes
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Whether the run should stop
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    /// Forward an update to the callback, if any
    pub fn report(&self, stage: Stage, current: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(Progress {
                stage,
                current,
                total,
            });
        }
    }
}

impl fmt::Debug for RunControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunControl")
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
