//! Scanning the renderer's textual error log.
//!
//! The renderer appends plain-text lines of the form
//! `[2024/Jan/01|12:00:05] error: <message>`. When a render call comes back
//! canceled or with a missing output file, the engine scans this log for the
//! first error stamped at or after the render started, which is usually the
//! actual cause.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{NaiveDateTime, Timelike};

/// Timestamp format of host log lines.
const LOG_TIME_FORMAT: &str = "[%Y/%b/%d|%H:%M:%S]";

/// First error message stamped at or after `since`, reformatted as
/// `"Error: <message>"`.
///
/// An unreadable or missing log is tolerated (logged, `None` returned): the
/// caller falls back to a generic message.
pub fn first_error_since(path: &Path, since: NaiveDateTime) -> Option<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!("Could not open host error log {}: {}", path.display(), err);
            return None;
        }
    };

    // Log stamps have second resolution; drop sub-second precision from the
    // cutoff so an error in the same second as the render start still counts.
    let since = since.with_nanosecond(0).unwrap_or(since);

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!("Error reading host error log {}: {}", path.display(), err);
                return None;
            }
        };
        if let Some(message) = error_message(&line, since) {
            return Some(message);
        }
    }
    None
}

/// Extract the reformatted error from one log line, if it is an error line
/// stamped at or after the cutoff.
fn error_message(line: &str, since: NaiveDateTime) -> Option<String> {
    if !line.contains("error: ") {
        return None;
    }
    let stamp_text = line.split(' ').next()?;
    let stamp = NaiveDateTime::parse_from_str(stamp_text, LOG_TIME_FORMAT).ok()?;
    if stamp < since {
        return None;
    }
    let message = line
        .replacen(&format!("{stamp_text} error"), "Error", 1)
        .trim()
        .to_string();
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::tempdir;

    fn stamp(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn write_log(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("renderlog.txt");
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn finds_error_after_start() {
        let dir = tempdir().unwrap();
        let path = write_log(
            dir.path(),
            &[
                "[2024/Jan/01|11:59:00] error: old failure",
                "[2024/Jan/01|12:00:10] progress: rendering",
                "[2024/Jan/01|12:00:12] error: UNHANDLED EXCEPTION",
            ],
        );
        let found = first_error_since(&path, stamp(12, 0, 5));
        assert_eq!(found.as_deref(), Some("Error: UNHANDLED EXCEPTION"));
    }

    #[test]
    fn ignores_errors_before_start() {
        let dir = tempdir().unwrap();
        let path = write_log(dir.path(), &["[2024/Jan/01|11:00:00] error: stale"]);
        assert_eq!(first_error_since(&path, stamp(12, 0, 0)), None);
    }

    #[test]
    fn same_second_counts() {
        let dir = tempdir().unwrap();
        let path = write_log(dir.path(), &["[2024/Jan/01|12:00:05] error: boom"]);
        assert_eq!(
            first_error_since(&path, stamp(12, 0, 5)).as_deref(),
            Some("Error: boom")
        );
    }

    #[test]
    fn missing_log_is_tolerated() {
        let dir = tempdir().unwrap();
        assert_eq!(
            first_error_since(&dir.path().join("absent.txt"), stamp(12, 0, 0)),
            None
        );
    }

    #[test]
    fn skips_lines_with_unparseable_stamps() {
        let dir = tempdir().unwrap();
        let path = write_log(
            dir.path(),
            &[
                "garbage error: no stamp here",
                "[2024/Jan/01|12:00:30] error: real one",
            ],
        );
        assert_eq!(
            first_error_since(&path, stamp(12, 0, 0)).as_deref(),
            Some("Error: real one")
        );
    }
}
