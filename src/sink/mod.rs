//! Result sink: where audit, match, and error records end up.
//!
//! The sink is the only shared mutable resource of a run; records are
//! appended monotonically in pipeline order.

pub mod file;

pub use file::{FileSink, SinkError};

/// One (file, line) hit of the target string, attributed to a
/// project+branch. Created only from successful scans with at least one
/// matched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub project: String,
    pub branch: String,
    /// Path relative to the workspace root.
    pub file: String,
    pub line_number: usize,
    /// Trimmed line content.
    pub line: String,
}

/// Audit record for one successfully fetched branch, written whether or
/// not anything matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDescriptor {
    pub project: String,
    pub branch: String,
    pub commit: String,
    pub committed_at: String,
    pub author: String,
}

/// Receives the run's records.
pub trait ResultSink {
    fn record_branch(&mut self, record: &BranchDescriptor);
    fn record_match(&mut self, record: &MatchRecord);
    fn record_error(&mut self, message: &str);
}

/// Sink that collects records in memory. Used by tests and by callers that
/// post-process results instead of persisting them.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub branches: Vec<BranchDescriptor>,
    pub matches: Vec<MatchRecord>,
    pub errors: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemorySink {
    fn record_branch(&mut self, record: &BranchDescriptor) {
        self.branches.push(record.clone());
    }

    fn record_match(&mut self, record: &MatchRecord) {
        self.matches.push(record.clone());
    }

    fn record_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
