//! Wire types for the GitLab REST API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A GitLab project as resolved for scanning.
///
/// Immutable once resolved; downstream components borrow it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// Clone URL over HTTP(S).
    #[serde(rename = "http_url_to_repo")]
    pub http_url: String,
}

/// A branch as listed for a project. Recomputed each run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    pub name: String,
}

impl BranchRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One commit returned by a bounded history query.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    #[serde(rename = "committed_date")]
    pub committed_at: DateTime<Utc>,
    pub author_name: String,
}
