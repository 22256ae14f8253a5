//! In-process line scanner.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::error::ScanError;
use super::{MatchedLine, SearchBackend};

/// Reads the file as UTF-8 and checks each line for literal containment of
/// the target.
pub struct InProcessSearcher;

impl SearchBackend for InProcessSearcher {
    fn search(&mut self, path: &Path, target: &str) -> Result<Vec<MatchedLine>, ScanError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            // Non-UTF-8 content surfaces as InvalidData from read_to_string.
            ErrorKind::InvalidData => ScanError::Decode(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let matched = content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(target))
            .map(|(i, line)| MatchedLine {
                line_number: i + 1,
                line: line.to_string(),
            })
            .collect();

        Ok(matched)
    }
}
