//! Run modes, per-frame outcomes, and the report types a run produces.

use std::path::{Path, PathBuf};

/// Which pass of the two-pass run is executing.
///
/// Both passes walk the identical per-entry pipeline; the pre-check pass
/// stops short of the actual render call and is where user prompts fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Dry-run pass that validates every entry without rendering.
    Precheck,
    /// Real pass that renders frames and writes files.
    Commit,
}

impl RunMode {
    /// Whether this is the dry-run pass.
    pub fn is_precheck(&self) -> bool {
        matches!(self, RunMode::Precheck)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Precheck => write!(f, "pre-check"),
            RunMode::Commit => write!(f, "commit"),
        }
    }
}

/// Classification of a single frame's render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Output file exists; the render completed.
    Rendered,
    /// The user canceled the render from the host.
    Canceled,
    /// The host reported an error or the output file is missing.
    Failed,
}

/// What happened to one queue entry during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Entry was disabled and not processed.
    Skipped,
    /// Pre-check validated the entry with no problems.
    CheckedOk,
    /// Pre-check found a problem with the entry.
    CheckedError,
    /// Every attempted frame rendered.
    Rendered,
    /// At least one frame was canceled by the user, none failed.
    Canceled,
    /// The entry failed validation or at least one frame failed.
    Failed,
}

/// Terminal outcome of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOutcome {
    /// Every processed entry rendered all of its frames.
    Completed,
    /// The run finished, but entries or frames were skipped or failed.
    CompletedWithErrors,
    /// The canceled-frame threshold stopped the queue early.
    Aborted,
    /// Pre-check found errors; the commit pass never started.
    PrecheckFailed,
    /// The user declined a pre-check warning.
    Declined,
    /// No enabled entry survived pre-check with work to do.
    NothingToRender,
}

impl QueueOutcome {
    /// Whether the commit pass ran to completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, QueueOutcome::Completed | QueueOutcome::CompletedWithErrors)
    }
}

/// One frame's result within an entry.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Frame number that was rendered.
    pub frame: i32,
    /// How the render call was classified.
    pub outcome: FrameOutcome,
    /// Final output path, when one was allocated.
    pub output: Option<PathBuf>,
    /// Failure detail, from the host's own log when available.
    pub detail: Option<String>,
}

impl FrameReport {
    /// Report a successfully rendered frame.
    pub fn rendered(frame: i32, output: &Path) -> Self {
        Self {
            frame,
            outcome: FrameOutcome::Rendered,
            output: Some(output.to_path_buf()),
            detail: None,
        }
    }

    /// Report a user-canceled frame.
    pub fn canceled(frame: i32) -> Self {
        Self {
            frame,
            outcome: FrameOutcome::Canceled,
            output: None,
            detail: None,
        }
    }

    /// Report a failed frame.
    pub fn failed(frame: i32, output: &Path, detail: impl Into<String>) -> Self {
        Self {
            frame,
            outcome: FrameOutcome::Failed,
            output: Some(output.to_path_buf()),
            detail: Some(detail.into()),
        }
    }
}

/// One entry's result within a pass.
#[derive(Debug, Clone)]
pub struct EntryReport {
    /// Position of the entry in the queue.
    pub index: usize,
    /// The entry's raw name field.
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Per-frame results; empty for skipped or failed-validation entries.
    pub frames: Vec<FrameReport>,
    /// Entry-fatal error text, when validation failed.
    pub error: Option<String>,
}

impl EntryReport {
    /// Report a disabled entry.
    pub fn skipped(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            status: EntryStatus::Skipped,
            frames: Vec::new(),
            error: None,
        }
    }

    /// Report a processed entry with its frame results.
    pub fn finished(
        index: usize,
        name: impl Into<String>,
        status: EntryStatus,
        frames: Vec<FrameReport>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            status,
            frames,
            error: None,
        }
    }

    /// Report an entry that failed validation.
    pub fn errored(
        index: usize,
        name: impl Into<String>,
        status: EntryStatus,
        error: impl Into<String>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            status,
            frames: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of one run.
///
/// The report covers whichever passes actually ran: a run that stops in
/// pre-check carries the pre-check entries, a full run carries the commit
/// entries with `would_render` taken from pre-check.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Terminal outcome of the run.
    pub outcome: QueueOutcome,
    /// Per-entry results, in queue order up to where the run stopped.
    pub entries: Vec<EntryReport>,
    /// Entries pre-check validated as renderable.
    pub would_render: usize,
    /// Frames the user canceled before the run ended.
    pub canceled_frames: usize,
}

impl RunReport {
    pub(crate) fn new(outcome: QueueOutcome) -> Self {
        Self {
            outcome,
            entries: Vec::new(),
            would_render: 0,
            canceled_frames: 0,
        }
    }

    /// Count frames that rendered across all entries.
    pub fn rendered_frames(&self) -> usize {
        self.count_frames(FrameOutcome::Rendered)
    }

    /// Count frames that failed across all entries.
    pub fn failed_frames(&self) -> usize {
        self.count_frames(FrameOutcome::Failed)
    }

    fn count_frames(&self, outcome: FrameOutcome) -> usize {
        self.entries
            .iter()
            .flat_map(|entry| entry.frames.iter())
            .filter(|frame| frame.outcome == outcome)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_completeness() {
        assert!(QueueOutcome::Completed.is_complete());
        assert!(QueueOutcome::CompletedWithErrors.is_complete());
        assert!(!QueueOutcome::Aborted.is_complete());
        assert!(!QueueOutcome::PrecheckFailed.is_complete());
    }

    #[test]
    fn report_counts_frames_by_outcome() {
        let mut report = RunReport::new(QueueOutcome::Completed);
        report.entries.push(EntryReport::finished(
            0,
            "a",
            EntryStatus::Rendered,
            vec![
                FrameReport::rendered(1, Path::new("/out/a.exr")),
                FrameReport::failed(2, Path::new("/out/b.exr"), "output file missing"),
            ],
        ));
        report.entries.push(EntryReport::skipped(1, "b"));

        assert_eq!(report.rendered_frames(), 1);
        assert_eq!(report.failed_frames(), 1);
    }
}
