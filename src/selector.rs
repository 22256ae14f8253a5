//! Branch selection: turns a project's full branch list into the ordered
//! subset to scan, under one of three policies.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::gitlab::{ApiError, BranchRef, CommitInfo, GitLabApi, COMMIT_VOLUME_WARN};

/// Branch selection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPolicy {
    /// Every branch, in input order. Any limit is ignored.
    All,
    /// Branches whose name the regex matches anywhere.
    NamePattern {
        pattern: String,
        limit: Option<usize>,
    },
    /// Branches with at least one commit in the last `window_days` days,
    /// newest representative commit first.
    RecentCommit {
        window_days: i64,
        limit: Option<usize>,
    },
}

/// Errors during branch selection. All fatal: selection happens before any
/// cloning for the project.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("Branch name pattern must be non-empty under the name_pattern policy")]
    EmptyPattern,

    #[error("Invalid branch name pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Supplies the bounded commit-window query for one project's branches.
///
/// The recent-commit policy issues exactly one call per branch; this is the
/// dominant cost center of a run.
pub trait CommitLister {
    fn commits_in_window(
        &self,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ApiError>;
}

/// [`CommitLister`] bound to one project of a [`GitLabApi`].
pub struct ProjectCommitLister<'a, A: GitLabApi> {
    api: &'a A,
    project_id: u64,
}

impl<'a, A: GitLabApi> ProjectCommitLister<'a, A> {
    pub fn new(api: &'a A, project_id: u64) -> Self {
        Self { api, project_id }
    }
}

impl<A: GitLabApi> CommitLister for ProjectCommitLister<'_, A> {
    fn commits_in_window(
        &self,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ApiError> {
        self.api
            .commits_in_window(self.project_id, branch, since, until)
    }
}

/// Select the ordered subset of branch names to process.
pub fn select<L: CommitLister>(
    branches: &[BranchRef],
    policy: &BranchPolicy,
    lister: &L,
) -> Result<Vec<String>, SelectError> {
    match policy {
        BranchPolicy::All => Ok(branches.iter().map(|b| b.name.clone()).collect()),

        BranchPolicy::NamePattern { pattern, limit } => {
            if pattern.is_empty() {
                return Err(SelectError::EmptyPattern);
            }
            let re = Regex::new(pattern).map_err(|e| SelectError::Pattern {
                pattern: pattern.clone(),
                source: e,
            })?;
            // Any match anywhere in the name qualifies.
            let mut selected: Vec<String> = branches
                .iter()
                .filter(|b| re.is_match(&b.name))
                .map(|b| b.name.clone())
                .collect();
            if let Some(limit) = *limit {
                selected.truncate(limit);
            }
            Ok(selected)
        }

        BranchPolicy::RecentCommit { window_days, limit } => {
            let until = Utc::now();
            let since = until - Duration::days(*window_days);

            let mut retained: Vec<(DateTime<Utc>, String)> = Vec::new();
            for branch in branches {
                let commits = lister.commits_in_window(&branch.name, since, until)?;
                if commits.is_empty() {
                    info!(
                        branch = %branch.name,
                        window_days,
                        "No commits in window, branch excluded"
                    );
                    continue;
                }
                if commits.len() > COMMIT_VOLUME_WARN {
                    // Informational only; the branch is retained and its
                    // representative commit is unchanged.
                    warn!(
                        branch = %branch.name,
                        commits = commits.len(),
                        "More than {} commits in window",
                        COMMIT_VOLUME_WARN
                    );
                }
                let newest = commits
                    .iter()
                    .map(|c| c.committed_at)
                    .max()
                    .unwrap_or(until);
                retained.push((newest, branch.name.clone()));
            }

            // Newest first; std's stable sort keeps input order on ties.
            retained.sort_by(|a, b| b.0.cmp(&a.0));
            let mut selected: Vec<String> = retained.into_iter().map(|(_, name)| name).collect();
            if let Some(limit) = *limit {
                selected.truncate(limit);
            }
            Ok(selected)
        }
    }
}
