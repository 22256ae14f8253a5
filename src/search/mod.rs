//! Content search: the backend contract and its two interchangeable
//! implementations.
//!
//! Backend choice is a run-wide configuration decision; both backends
//! honor the same contract: all literal occurrences of the target, in line
//! order with 1-based numbering, or a scan error (never both).

pub mod error;
pub mod external;
pub mod in_process;

pub use error::{BackendError, ScanError};
pub use external::ExternalSearcher;
pub use in_process::InProcessSearcher;

use std::path::Path;

use crate::config::SearchBackendKind;

/// One matched line of a scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLine {
    /// 1-based line number.
    pub line_number: usize,
    pub line: String,
}

/// Scans one file's text for literal occurrences of a target string.
pub trait SearchBackend {
    fn search(&mut self, path: &Path, target: &str) -> Result<Vec<MatchedLine>, ScanError>;
}

/// Build the configured backend. The external backend is a long-lived
/// resource acquired here once and reused for every file of the run.
pub fn build_backend(
    kind: SearchBackendKind,
    external_command: &[String],
) -> Result<Box<dyn SearchBackend>, BackendError> {
    match kind {
        SearchBackendKind::InProcess => Ok(Box::new(InProcessSearcher)),
        SearchBackendKind::External => {
            Ok(Box::new(ExternalSearcher::spawn(external_command)?))
        }
    }
}
