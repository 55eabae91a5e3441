//! Output-path allocation and overwrite avoidance.
//!
//! Every frame writes to `{stem}_{frame:04}_{run_stamp}{suffix}.exr` inside
//! the entry's target directory, with a matching `.png` preview next to it.
//! The run stamp is fixed once per queue run so all frames of one run sort
//! together; `suffix` is only added when the name is already taken.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::entries::DEFAULT_PATH_TEXT;

use super::errors::{EntryError, EntryResult};

/// Timestamp layout embedded in output file names, e.g. `24-06-18T14.18.45`.
pub const STAMP_FORMAT: &str = "%y-%m-%dT%H.%M.%S";

/// Format the shared timestamp for one queue run.
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

/// The per-entry output target both passes render against.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    /// Directory the frames land in.
    pub directory: PathBuf,
    /// Base EXR path before per-frame naming.
    pub exr: PathBuf,
    /// Base PNG preview path before per-frame naming.
    pub png: PathBuf,
}

/// One frame's allocated path.
#[derive(Debug, Clone)]
pub struct FramePath {
    /// First free path for this frame.
    pub path: PathBuf,
    /// How many existing files had to be skipped over.
    pub collisions: u32,
    /// The path that would have been used had nothing existed.
    pub first_candidate: PathBuf,
}

/// Resolve an entry's path field into its output target.
///
/// The default-path sentinel derives the target from the queue's default
/// output directory; a literal path contributes only its containing
/// directory, the file names always come from the resolved render name.
/// The directory must already exist. It is never created here.
pub fn resolve_target(
    path_field: &str,
    name: &str,
    default_dir: &Path,
    project_root: &Path,
) -> EntryResult<OutputTarget> {
    let directory = if path_field == DEFAULT_PATH_TEXT {
        absolutize(project_root, default_dir)
    } else {
        let literal = absolutize(project_root, Path::new(path_field));
        match literal.parent() {
            Some(parent) => parent.to_path_buf(),
            None => project_root.to_path_buf(),
        }
    };

    if !directory.is_dir() {
        return Err(EntryError::missing_output_dir(directory));
    }

    let exr = directory.join(format!("{name}.exr"));
    let png = directory.join(format!("{name}.png"));
    Ok(OutputTarget {
        directory,
        exr,
        png,
    })
}

/// Find the first free on-disk name for one frame of a base path.
///
/// Probes `{stem}_{frame:04}_{stamp}.ext`, then appends `" (1)"`, `" (2)"`
/// and so on until a name is free.
pub fn unique_frame_path(base: &Path, frame: i32, stamp: &str) -> FramePath {
    let directory = base.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut collisions = 0u32;
    let mut first_candidate = PathBuf::new();
    loop {
        let suffix = if collisions == 0 {
            String::new()
        } else {
            format!(" ({collisions})")
        };
        let candidate = directory.join(format!("{stem}_{frame:04}_{stamp}{suffix}{extension}"));
        if collisions == 0 {
            first_candidate = candidate.clone();
        }
        if !candidate.exists() {
            return FramePath {
                path: candidate,
                collisions,
                first_candidate,
            };
        }
        collisions += 1;
    }
}

/// Resolve a path against the host's project root.
fn absolutize(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
