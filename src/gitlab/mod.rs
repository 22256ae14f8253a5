//! GitLab API boundary.
//!
//! The rest of the pipeline only sees the [`GitLabApi`] trait; the blocking
//! HTTP client lives behind it so resolution and selection stay testable
//! without a live instance.

pub mod client;
pub mod error;
pub mod types;

pub use client::GitLabClient;
pub use error::ApiError;
pub use types::{BranchRef, CommitInfo, Project};

use chrono::{DateTime, Utc};

/// Read-only GitLab operations the pipeline depends on.
pub trait GitLabApi {
    /// List all projects under a group, in API-returned order.
    fn list_group_projects(&self, group_id: u64) -> Result<Vec<Project>, ApiError>;

    /// Resolve one project by numeric id.
    fn project_by_id(&self, id: u64) -> Result<Project, ApiError>;

    /// Resolve one project by its namespaced path (e.g. `team/service-api`).
    fn project_by_path(&self, path: &str) -> Result<Project, ApiError>;

    /// List all branches of a project, in API-returned order.
    fn list_branches(&self, project_id: u64) -> Result<Vec<BranchRef>, ApiError>;

    /// Query commits on `branch` with a timestamp in `[since, until]`.
    ///
    /// This is a single bounded call: it returns at most
    /// [`COMMIT_WINDOW_PROBE`] commits and never pages past the window.
    fn commits_in_window(
        &self,
        project_id: u64,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ApiError>;
}

/// Upper bound on commits fetched per branch-window query. One more than
/// the volume-warning threshold so "more than 20" is observable from a
/// single response.
pub const COMMIT_WINDOW_PROBE: usize = 21;

/// Commit count above which a branch gets a volume warning during
/// recent-commit selection.
pub const COMMIT_VOLUME_WARN: usize = 20;
