//! Per-pass summaries of recoverable problems

use std::fmt;
use std::path::PathBuf;

use hdmod_formats::Scale;
use hdmod_formats::directive::DirectiveError;
use hdmod_formats::pak::DecodeExhausted;
use hdmod_sprites::SpriteError;

/// What went wrong with one entry or frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A directive line was skipped
    MalformedDirective {
        /// 1-based line number
        line: usize,
        /// Parser message
        reason: String,
    },
    /// A directive referenced a missing payload image
    ImageIndexOutOfRange {
        /// Frame that was skipped
        frame: String,
        /// Requested index
        index: usize,
        /// Images in the entry
        available: usize,
    },
    /// A payload image could not be decoded
    UndecodableImage {
        /// Frame that referenced it, when known
        frame: Option<String>,
        /// Payload index
        index: usize,
    },
    /// Inflate stopped before the compressed region ended
    DecodeExhausted {
        /// Images recovered before the stall
        recovered: usize,
        /// Compressed bytes left over
        remaining_bytes: usize,
    },
    /// One frame was dropped after its directive parsed
    FrameSkipped {
        /// Frame that was skipped
        frame: String,
        /// Why
        reason: String,
    },
    /// The whole entry was dropped
    EntrySkipped {
        /// Why
        reason: String,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDirective { line, reason } => {
                write!(f, "directive line {line} skipped: {reason}")
            }
            Self::ImageIndexOutOfRange {
                frame,
                index,
                available,
            } => write!(
                f,
                "frame {frame} skipped: image {index} requested, {available} present"
            ),
            Self::UndecodableImage {
                frame: Some(frame),
                index,
            } => write!(f, "frame {frame}: image {index} could not be decoded"),
            Self::UndecodableImage { frame: None, index } => {
                write!(f, "image {index} could not be decoded")
            }
            Self::DecodeExhausted {
                recovered,
                remaining_bytes,
            } => write!(
                f,
                "inflate stopped after {recovered} images with {remaining_bytes} bytes left"
            ),
            Self::FrameSkipped { frame, reason } => write!(f, "frame {frame} skipped: {reason}"),
            Self::EntrySkipped { reason } => write!(f, "entry skipped: {reason}"),
        }
    }
}

impl From<&DirectiveError> for IssueKind {
    fn from(error: &DirectiveError) -> Self {
        match error {
            DirectiveError::Malformed { line, reason } => Self::MalformedDirective {
                line: *line,
                reason: reason.clone(),
            },
        }
    }
}

impl From<&DecodeExhausted> for IssueKind {
    fn from(exhausted: &DecodeExhausted) -> Self {
        Self::DecodeExhausted {
            recovered: exhausted.recovered,
            remaining_bytes: exhausted.remaining_bytes,
        }
    }
}

impl From<&SpriteError> for IssueKind {
    fn from(error: &SpriteError) -> Self {
        match error {
            SpriteError::ImageIndexOutOfRange {
                frame,
                index,
                available,
            } => Self::ImageIndexOutOfRange {
                frame: frame.to_string(),
                index: *index,
                available: *available,
            },
            SpriteError::UndecodableImage { frame, index } => Self::UndecodableImage {
                frame: Some(frame.to_string()),
                index: *index,
            },
            SpriteError::OversizedCrop { frame, .. } => Self::FrameSkipped {
                frame: frame.to_string(),
                reason: error.to_string(),
            },
            other => Self::EntrySkipped {
                reason: other.to_string(),
            },
        }
    }
}

/// A recoverable problem with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Archive file name
    pub archive: String,
    /// Entry id
    pub entry: String,
    /// Problem
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.archive, self.entry, self.kind)
    }
}

/// Outcome of one scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Scale processed
    pub scale: Scale,
    /// Archives opened
    pub archives: usize,
    /// Entries decoded
    pub entries: usize,
    /// Bitmaps packaged
    pub bitmaps: usize,
    /// Sprite groups packaged
    pub groups: usize,
    /// Recoverable problems, in archive and entry order
    pub issues: Vec<Issue>,
    /// Set when a malformed archive stopped the pass; nothing was written
    pub aborted: Option<String>,
}

impl PassReport {
    /// Empty report for `scale`
    pub const fn new(scale: Scale) -> Self {
        Self {
            scale,
            archives: 0,
            entries: 0,
            bitmaps: 0,
            groups: 0,
            issues: Vec::new(),
            aborted: None,
        }
    }

    /// Whether files were written for this scale
    pub const fn is_packaged(&self) -> bool {
        self.aborted.is_none()
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Locale code the translation mods were named after
    pub locale: String,
    /// One report per requested scale
    pub passes: Vec<PassReport>,
    /// Files finalized, in write order
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    /// Recoverable problems across all passes
    pub fn issue_count(&self) -> usize {
        self.passes.iter().map(|p| p.issues.len()).sum()
    }

    /// Passes stopped by a malformed archive
    pub fn aborted_passes(&self) -> impl Iterator<Item = &PassReport> {
        self.passes.iter().filter(|p| !p.is_packaged())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use hdmod_formats::CanonicalName;

    #[test]
    fn test_issue_from_sprite_error() {
        let error = SpriteError::ImageIndexOutOfRange {
            frame: CanonicalName::new("f01"),
            index: 4,
            available: 1,
        };
        let issue = Issue {
            archive: "sprite_x2.pak".to_string(),
            entry: "AVWMINE".to_string(),
            kind: IssueKind::from(&error),
        };
        assert_eq!(
            issue.to_string(),
            "sprite_x2.pak:AVWMINE: frame F01 skipped: image 4 requested, 1 present"
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut ok = PassReport::new(Scale::X2);
        ok.issues.push(Issue {
            archive: "a".to_string(),
            entry: "b".to_string(),
            kind: IssueKind::EntrySkipped {
                reason: "empty".to_string(),
            },
        });
        let mut broken = PassReport::new(Scale::X3);
        broken.aborted = Some("malformed archive".to_string());

        let summary = RunSummary {
            locale: "EN".to_string(),
            passes: vec![ok, broken],
            written: Vec::new(),
        };
        assert_eq!(summary.issue_count(), 1);
        assert_eq!(summary.aborted_passes().count(), 1);
    }
}
