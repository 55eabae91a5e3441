//! Frame-range parsing.
//!
//! Turns the entry's range field into the concrete, ordered list of frame
//! numbers a render walks. Order is preserved exactly as written and
//! duplicates are never collapsed, so a picked list like `"5, 5"` really
//! renders frame 5 twice.

use crate::entries::is_default_field;
use crate::host::TimeOutput;

use super::errors::{EntryError, EntryResult};

/// Resolve a range field into frame numbers.
///
/// The `Default` sentinel defers to the host's current render-time mode;
/// anything else must be a literal `"start:end"`. A literal range with
/// `start > end` resolves to no frames at all, which is not an error.
pub fn resolve(field: &str, time_output: &TimeOutput) -> EntryResult<Vec<i32>> {
    if is_default_field(field) {
        return resolve_time_output(time_output);
    }
    parse_literal(field)
}

/// Human-readable form of a frame list.
///
/// A contiguous ascending run prints as `"first-last"`; everything else
/// prints the individual frames comma-separated.
pub fn display(frames: &[i32]) -> String {
    if frames.len() >= 2 && is_contiguous(frames) {
        return format!("{}-{}", frames[0], frames[frames.len() - 1]);
    }
    frames
        .iter()
        .map(|frame| frame.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn resolve_time_output(time_output: &TimeOutput) -> EntryResult<Vec<i32>> {
    match time_output {
        TimeOutput::Single { frame } => Ok(vec![*frame]),
        TimeOutput::ActiveSegment { start, end } => Ok(expand(*start, *end, 1)),
        TimeOutput::Range {
            start,
            end,
            every_nth,
        } => Ok(expand(*start, *end, (*every_nth).max(1))),
        TimeOutput::Frames { spec } => parse_picked_list(spec),
    }
}

fn parse_literal(field: &str) -> EntryResult<Vec<i32>> {
    let mut parts = field.split(':');
    let first = parts.next().unwrap_or("").trim();
    let last = parts.last().unwrap_or(first).trim();

    if first == last {
        return Ok(vec![parse_frame(first)?]);
    }
    let start = parse_frame(first)?;
    let end = parse_frame(last)?;
    Ok(expand(start, end, 1))
}

/// Parse a picked-frame list such as `"1, 3-5, 8"`.
///
/// Parts are either single integers or inclusive `A-B` ranges and are
/// concatenated in written order. A lone negative number is an integer,
/// not a range.
fn parse_picked_list(spec: &str) -> EntryResult<Vec<i32>> {
    let mut frames = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if let Ok(frame) = part.parse::<i32>() {
            frames.push(frame);
            continue;
        }
        // A range separator is a '-' that is not a leading sign.
        let split_at = part
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .map(|(i, _)| i);
        let Some(split_at) = split_at else {
            return Err(EntryError::parse(
                "frame range",
                format!("invalid frame number '{part}'"),
            ));
        };
        let start = parse_frame(&part[..split_at])?;
        let end = parse_frame(&part[split_at + 1..])?;
        frames.extend(expand(start, end, 1));
    }
    Ok(frames)
}

fn parse_frame(text: &str) -> EntryResult<i32> {
    text.trim().parse::<i32>().map_err(|_| {
        EntryError::parse("frame range", format!("invalid frame number '{text}'"))
    })
}

fn expand(start: i32, end: i32, step: i32) -> Vec<i32> {
    if start > end {
        return Vec::new();
    }
    (start..=end).step_by(step as usize).collect()
}

fn is_contiguous(frames: &[i32]) -> bool {
    frames
        .windows(2)
        .all(|pair| pair[0].checked_add(1) == Some(pair[1]))
}
