//! File-backed result sink: `match.log`, `branch.log`, `err.log`, and a
//! CSV export mirroring the match records.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use super::{BranchDescriptor, MatchRecord, ResultSink};

/// Files produced by one run, relative to the log directory.
const MATCH_LOG: &str = "match.log";
const BRANCH_LOG: &str = "branch.log";
const ERR_LOG: &str = "err.log";
const CSV_EXPORT: &str = "matches.csv";

const CSV_HEADER: &str = "repository,branch,file path,line number,line content";

/// The sink could not be prepared. Fatal: without it no results can be
/// persisted.
#[derive(Debug, Error)]
#[error("Failed to prepare result sink at {path}: {source}")]
pub struct SinkError {
    path: String,
    #[source]
    source: std::io::Error,
}

/// Appends records to the log files under one directory. Previous runs'
/// files are removed on creation.
pub struct FileSink {
    match_log: File,
    branch_log: File,
    err_log: File,
    csv: File,
    error_count: usize,
}

impl FileSink {
    pub fn create(log_dir: &Path) -> Result<Self, SinkError> {
        fs::create_dir_all(log_dir).map_err(|e| SinkError {
            path: log_dir.display().to_string(),
            source: e,
        })?;

        // Stale results from a previous run must not mix with this one.
        for name in [MATCH_LOG, BRANCH_LOG, ERR_LOG, CSV_EXPORT] {
            let path = log_dir.join(name);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| SinkError {
                    path: path.display().to_string(),
                    source: e,
                })?;
            }
        }

        let mut csv = open_append(&log_dir.join(CSV_EXPORT))?;
        if let Err(e) = writeln!(csv, "{}", CSV_HEADER) {
            warn!(error = %e, "Failed to write CSV header");
        }

        Ok(Self {
            match_log: open_append(&log_dir.join(MATCH_LOG))?,
            branch_log: open_append(&log_dir.join(BRANCH_LOG))?,
            err_log: open_append(&log_dir.join(ERR_LOG))?,
            csv,
            error_count: 0,
        })
    }

    /// Number of error records written so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }
}

fn open_append(path: &PathBuf) -> Result<File, SinkError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SinkError {
            path: path.display().to_string(),
            source: e,
        })
}

fn append_line(file: &mut File, line: &str) {
    if let Err(e) = writeln!(file, "{}", line) {
        warn!(error = %e, "Failed to append result record");
    }
}

/// Quote a CSV field when it contains the delimiter, quotes, or newlines.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl ResultSink for FileSink {
    fn record_branch(&mut self, record: &BranchDescriptor) {
        let line = format!(
            "{}-{}-{}-{}-{}",
            record.project, record.branch, record.commit, record.committed_at, record.author
        );
        append_line(&mut self.branch_log, &line);
    }

    fn record_match(&mut self, record: &MatchRecord) {
        let line = format!(
            "{}-{}-{}-{}-{}",
            record.project, record.branch, record.file, record.line_number, record.line
        );
        append_line(&mut self.match_log, &line);

        let row = [
            escape_csv(&record.project),
            escape_csv(&record.branch),
            escape_csv(&record.file),
            record.line_number.to_string(),
            escape_csv(&record.line),
        ]
        .join(",");
        append_line(&mut self.csv, &row);
    }

    fn record_error(&mut self, message: &str) {
        self.error_count += 1;
        append_line(&mut self.err_log, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn match_record() -> MatchRecord {
        MatchRecord {
            project: "auth-service".to_string(),
            branch: "release/1.2".to_string(),
            file: "src/api/payments.js".to_string(),
            line_number: 7,
            line: "callApiX(token)".to_string(),
        }
    }

    #[test]
    fn test_match_record_formats() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::create(dir.path()).unwrap();
        sink.record_match(&match_record());
        drop(sink);

        let log = fs::read_to_string(dir.path().join(MATCH_LOG)).unwrap();
        assert_eq!(
            log.trim(),
            "auth-service-release/1.2-src/api/payments.js-7-callApiX(token)"
        );

        let csv = fs::read_to_string(dir.path().join(CSV_EXPORT)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("auth-service,release/1.2,src/api/payments.js,7,callApiX(token)")
        );
    }

    #[test]
    fn test_branch_record_format() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::create(dir.path()).unwrap();
        sink.record_branch(&BranchDescriptor {
            project: "auth-service".to_string(),
            branch: "main".to_string(),
            commit: "abc123".to_string(),
            committed_at: "2026-08-20T10:00:00+00:00".to_string(),
            author: "dev".to_string(),
        });
        drop(sink);

        let log = fs::read_to_string(dir.path().join(BRANCH_LOG)).unwrap();
        assert_eq!(
            log.trim(),
            "auth-service-main-abc123-2026-08-20T10:00:00+00:00-dev"
        );
    }

    #[test]
    fn test_previous_run_files_are_cleared() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MATCH_LOG), "old contents\n").unwrap();

        let sink = FileSink::create(dir.path()).unwrap();
        drop(sink);

        let log = fs::read_to_string(dir.path().join(MATCH_LOG)).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_error_count_tracks_records() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::create(dir.path()).unwrap();
        assert_eq!(sink.error_count(), 0);
        sink.record_error("project: x, branch: y: clone failed");
        sink.record_error("another");
        assert_eq!(sink.error_count(), 2);

        drop(sink);
        let log = fs::read_to_string(dir.path().join(ERR_LOG)).unwrap();
        assert_eq!(log.lines().count(), 2);
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
