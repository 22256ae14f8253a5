//! Ephemeral branch checkouts.
//!
//! Each selected (project, branch) pair is materialized into a deterministic
//! local directory for the duration of its scan and removed unconditionally
//! afterwards, whatever the scan's outcome.

pub mod error;

pub use error::FetchError;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::gitlab::Project;

/// One ephemeral checkout, bound to exactly one (project, branch) pair.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    pub project: String,
    pub branch: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, project: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            project: project.into(),
            branch: branch.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Head metadata of a fetched branch, for the audit record.
#[derive(Debug, Clone)]
pub struct BranchHead {
    pub commit: String,
    /// Strict ISO-8601 committer date, as git reports it.
    pub committed_at: String,
    pub author: String,
}

/// Materializes and releases workspaces.
pub trait Fetcher {
    /// Shallow-checkout `branch` of `project` into a fresh workspace.
    fn fetch(&self, project: &Project, branch: &str) -> Result<Workspace, FetchError>;

    /// Read head commit metadata from a fetched workspace.
    fn branch_head(&self, workspace: &Workspace) -> Result<BranchHead, FetchError>;

    /// Remove the workspace tree. Best-effort; must be called on every exit
    /// path of the branch-processing unit.
    fn release(&self, workspace: &Workspace);
}

/// Fetcher that shells out to the `git` CLI.
pub struct WorkspaceFetcher {
    base_dir: PathBuf,
}

impl WorkspaceFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Deterministic workspace path keyed by (projectName, branchName).
    pub fn workspace_path(&self, project_name: &str, branch: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}-{}", sanitize(project_name), sanitize(branch)))
    }

    fn check_git_available(&self) -> Result<(), FetchError> {
        Command::new("git")
            .arg("--version")
            .output()
            .map_err(|_| FetchError::GitNotFound)?;
        Ok(())
    }

    fn execute_clone(
        &self,
        project: &Project,
        branch: &str,
        path: &Path,
    ) -> Result<(), FetchError> {
        let mut cmd = Command::new("git");

        // Shallow, single-branch, hooks disabled.
        cmd.args([
            "clone",
            "--depth",
            "1",
            "--single-branch",
            "--no-tags",
            "-c",
            "core.hooksPath=/dev/null",
            "-c",
            "advice.detachedHead=false",
            "--branch",
            branch,
        ]);
        cmd.arg(&project.http_url);
        cmd.arg(path);

        let output = cmd.output().map_err(|e| FetchError::CloneFailed {
            project: project.name.clone(),
            branch: branch.to_string(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::CloneFailed {
                project: project.name.clone(),
                branch: branch.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

impl Fetcher for WorkspaceFetcher {
    fn fetch(&self, project: &Project, branch: &str) -> Result<Workspace, FetchError> {
        self.check_git_available()?;

        fs::create_dir_all(&self.base_dir).map_err(|e| FetchError::Prepare {
            path: self.base_dir.display().to_string(),
            source: e,
        })?;

        let path = self.workspace_path(&project.name, branch);
        if path.exists() {
            // Leftover from a crashed prior run.
            warn!(path = %path.display(), "Removing stale workspace");
            fs::remove_dir_all(&path).map_err(|e| FetchError::Prepare {
                path: path.display().to_string(),
                source: e,
            })?;
        }

        self.execute_clone(project, branch, &path)?;
        debug!(path = %path.display(), "Cloned branch");

        Ok(Workspace {
            root: path,
            project: project.name.clone(),
            branch: branch.to_string(),
        })
    }

    fn branch_head(&self, workspace: &Workspace) -> Result<BranchHead, FetchError> {
        let output = Command::new("git")
            .args(["log", "-1", "--format=%H%x1f%cI%x1f%an"])
            .current_dir(workspace.root())
            .output()
            .map_err(|e| FetchError::Head {
                path: workspace.root().display().to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(FetchError::Head {
                path: workspace.root().display().to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut fields = stdout.trim().split('\u{1f}');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(commit), Some(committed_at), Some(author)) => Ok(BranchHead {
                commit: commit.to_string(),
                committed_at: committed_at.to_string(),
                author: author.to_string(),
            }),
            _ => Err(FetchError::Head {
                path: workspace.root().display().to_string(),
                message: format!("unexpected git log output: {:?}", stdout.trim()),
            }),
        }
    }

    fn release(&self, workspace: &Workspace) {
        // Best-effort: removal errors are logged, never propagated.
        if let Err(e) = fs::remove_dir_all(workspace.root()) {
            if workspace.root().exists() {
                warn!(
                    path = %workspace.root().display(),
                    error = %e,
                    "Failed to remove workspace"
                );
            }
        }
    }
}

/// Path separators in project or branch names would escape the base dir.
fn sanitize(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
