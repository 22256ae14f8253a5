//! The scan orchestrator: drives resolution, selection, fetching,
//! enumeration, and searching, strictly sequentially, with per-branch
//! failure isolation.

use thiserror::Error;
use tracing::{error, info};

use crate::config::{Config, ConfigError};
use crate::discovery::{self, EnumerateError, FileRule};
use crate::gitlab::{ApiError, GitLabApi, Project};
use crate::resolver::{ProjectMode, ProjectResolver, ResolveError};
use crate::search::{BackendError, SearchBackend};
use crate::selector::{self, BranchPolicy, ProjectCommitLister, SelectError};
use crate::sink::{BranchDescriptor, MatchRecord, ResultSink, SinkError};
use crate::workspace::{FetchError, Fetcher, Workspace};

/// Validated inputs of one run, derived from [`Config`] once and passed by
/// reference into each component. Components never read ambient state.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub mode: ProjectMode,
    pub policy: BranchPolicy,
    pub rule: FileRule,
    pub target: String,
    pub list_branches_only: bool,
}

impl SweepPlan {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mode: config.project_mode()?,
            policy: config.branch_policy(),
            rule: config.file_rule()?,
            target: config.search.target.clone(),
            list_branches_only: config.list_branches_only,
        })
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub projects: usize,
    /// Branches selected for processing across all projects.
    pub branches: usize,
    pub matches: usize,
    /// Recovered errors written to the error channel.
    pub errors: usize,
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    FileRule(#[from] EnumerateError),
}

/// Errors recovered at the branch boundary: logged with project+branch
/// context, branch skipped, run continues.
#[derive(Debug, Error)]
enum BranchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Enumerate(#[from] EnumerateError),
}

/// What one branch unit contributed to the run.
#[derive(Debug, Default)]
struct BranchStats {
    matches: usize,
    errors: usize,
}

/// Run the whole sweep. One project at a time, one branch at a time, one
/// file at a time; ordering follows each component's output order.
pub fn run_sweep<A: GitLabApi, F: Fetcher, S: ResultSink>(
    plan: &SweepPlan,
    api: &A,
    base_url: &str,
    fetcher: &F,
    backend: &mut dyn SearchBackend,
    sink: &mut S,
) -> Result<RunSummary, FatalError> {
    // Bad file-rule parameters abort before any cloning.
    discovery::validate(&plan.rule)?;

    let resolver = ProjectResolver::new(api, base_url);
    let projects = resolver.resolve(&plan.mode)?;
    info!(projects = projects.len(), "Starting sweep");

    let mut summary = RunSummary {
        projects: projects.len(),
        ..Default::default()
    };

    for project in &projects {
        info!(project = %project.name, "Processing project");

        let branches = api.list_branches(project.id)?;
        let lister = ProjectCommitLister::new(api, project.id);
        let selected = selector::select(&branches, &plan.policy, &lister)?;
        info!(
            project = %project.name,
            selected = selected.len(),
            "Branches selected"
        );

        for branch in &selected {
            summary.branches += 1;

            if plan.list_branches_only {
                // Legitimate short-circuit: name only, no fetch or scan.
                info!(project = %project.name, branch = %branch, "Selected branch");
                continue;
            }

            match process_branch(project, branch, plan, fetcher, backend, sink) {
                Ok(stats) => {
                    summary.matches += stats.matches;
                    summary.errors += stats.errors;
                }
                Err(e) => {
                    let message =
                        format!("project: {}, branch: {}: {}", project.name, branch, e);
                    error!("{}", message);
                    sink.record_error(&message);
                    summary.errors += 1;
                }
            }
        }
    }

    Ok(summary)
}

/// Fetch, scan, and release one branch. `release` runs on every exit path
/// once the fetch has succeeded.
fn process_branch<F: Fetcher, S: ResultSink>(
    project: &Project,
    branch: &str,
    plan: &SweepPlan,
    fetcher: &F,
    backend: &mut dyn SearchBackend,
    sink: &mut S,
) -> Result<BranchStats, BranchError> {
    let workspace = fetcher.fetch(project, branch)?;
    info!(project = %project.name, branch = %branch, "Fetched branch");

    let mut scanned = scan_workspace(&workspace, plan, backend, sink);

    // One audit record per successfully fetched branch, whatever the scan
    // outcome.
    match fetcher.branch_head(&workspace) {
        Ok(head) => sink.record_branch(&BranchDescriptor {
            project: project.name.clone(),
            branch: branch.to_string(),
            commit: head.commit,
            committed_at: head.committed_at,
            author: head.author,
        }),
        Err(e) => {
            let message = format!("project: {}, branch: {}: {}", project.name, branch, e);
            error!("{}", message);
            sink.record_error(&message);
            if let Ok(ref mut stats) = scanned {
                stats.errors += 1;
            }
        }
    }

    fetcher.release(&workspace);
    scanned
}

/// Enumerate and search every candidate file of a fetched workspace.
/// Per-file scan failures go to the error channel; the rest of the branch
/// is still processed.
fn scan_workspace<S: ResultSink>(
    workspace: &Workspace,
    plan: &SweepPlan,
    backend: &mut dyn SearchBackend,
    sink: &mut S,
) -> Result<BranchStats, BranchError> {
    let files = discovery::enumerate(workspace.root(), &plan.rule)?;
    info!(
        project = %workspace.project,
        branch = %workspace.branch,
        files = files.len(),
        "Scanning candidate files"
    );

    let mut stats = BranchStats::default();
    for file in &files {
        let absolute = workspace.root().join(file);
        match backend.search(&absolute, &plan.target) {
            Ok(matched_lines) => {
                for matched in matched_lines {
                    sink.record_match(&MatchRecord {
                        project: workspace.project.clone(),
                        branch: workspace.branch.clone(),
                        file: file.to_string_lossy().to_string(),
                        line_number: matched.line_number,
                        line: matched.line.trim().to_string(),
                    });
                    stats.matches += 1;
                }
            }
            Err(e) => {
                let message = format!(
                    "project: {}, branch: {}: {}",
                    workspace.project, workspace.branch, e
                );
                error!("{}", message);
                sink.record_error(&message);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::{BranchRef, CommitInfo};
    use crate::resolver::ProjectFilter;
    use crate::search::InProcessSearcher;
    use crate::sink::MemorySink;
    use crate::workspace::BranchHead;
    use chrono::{DateTime, Utc};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    struct StubApi {
        projects: Vec<Project>,
        branches: Vec<BranchRef>,
    }

    impl GitLabApi for StubApi {
        fn list_group_projects(&self, _group_id: u64) -> Result<Vec<Project>, ApiError> {
            Ok(self.projects.clone())
        }

        fn project_by_id(&self, id: u64) -> Result<Project, ApiError> {
            self.projects
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| ApiError::ProjectNotFound(id.to_string()))
        }

        fn project_by_path(&self, path: &str) -> Result<Project, ApiError> {
            Err(ApiError::ProjectNotFound(path.to_string()))
        }

        fn list_branches(&self, _project_id: u64) -> Result<Vec<BranchRef>, ApiError> {
            Ok(self.branches.clone())
        }

        fn commits_in_window(
            &self,
            _project_id: u64,
            _branch: &str,
            _since: DateTime<Utc>,
            _until: DateTime<Utc>,
        ) -> Result<Vec<CommitInfo>, ApiError> {
            Ok(Vec::new())
        }
    }

    /// Fetcher backed by pre-built fixture directories; `feature/broken`
    /// fails to fetch. Records every release for cleanup assertions.
    struct FixtureFetcher {
        base: TempDir,
        released: RefCell<Vec<String>>,
    }

    impl FixtureFetcher {
        fn new() -> Self {
            Self {
                base: TempDir::new().unwrap(),
                released: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for FixtureFetcher {
        fn fetch(&self, project: &Project, branch: &str) -> Result<Workspace, FetchError> {
            if branch == "feature/broken" {
                return Err(FetchError::CloneFailed {
                    project: project.name.clone(),
                    branch: branch.to_string(),
                    message: "simulated clone failure".to_string(),
                });
            }
            let root = self
                .base
                .path()
                .join(format!("{}-{}", project.name, branch.replace('/', "_")));
            fs::create_dir_all(&root).unwrap();
            fs::write(root.join("app.go"), "x := 1\n// TODO fix\ny := 2\n").unwrap();
            Ok(Workspace::new(root, project.name.clone(), branch))
        }

        fn branch_head(&self, _workspace: &Workspace) -> Result<BranchHead, FetchError> {
            Ok(BranchHead {
                commit: "deadbeef".to_string(),
                committed_at: "2026-08-20T10:00:00+00:00".to_string(),
                author: "dev".to_string(),
            })
        }

        fn release(&self, workspace: &Workspace) {
            self.released
                .borrow_mut()
                .push(workspace.branch.clone());
            let _ = fs::remove_dir_all(workspace.root());
        }
    }

    fn plan(list_only: bool) -> SweepPlan {
        SweepPlan {
            mode: ProjectMode::Group {
                group_id: Some(1),
                filter: ProjectFilter::All,
            },
            policy: BranchPolicy::All,
            rule: FileRule::Extension(vec![".go".to_string()]),
            target: "TODO".to_string(),
            list_branches_only: list_only,
        }
    }

    fn stub_api(branches: &[&str]) -> StubApi {
        StubApi {
            projects: vec![Project {
                id: 1,
                name: "svc".to_string(),
                http_url: "https://gitlab.example.com/team/svc.git".to_string(),
            }],
            branches: branches.iter().map(|b| BranchRef::new(*b)).collect(),
        }
    }

    #[test]
    fn test_branch_failure_is_isolated() {
        let api = stub_api(&["main", "feature/broken", "develop"]);
        let fetcher = FixtureFetcher::new();
        let mut backend = InProcessSearcher;
        let mut sink = MemorySink::new();

        let summary = run_sweep(
            &plan(false),
            &api,
            "https://gitlab.example.com",
            &fetcher,
            &mut backend,
            &mut sink,
        )
        .unwrap();

        // The broken branch is skipped; the other two still scanned.
        assert_eq!(summary.branches, 3);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(sink.branches.len(), 2);
        assert_eq!(sink.errors.len(), 1);
        assert!(sink.errors[0].contains("svc"));
        assert!(sink.errors[0].contains("feature/broken"));
    }

    #[test]
    fn test_successful_branches_are_released() {
        let api = stub_api(&["main", "develop"]);
        let fetcher = FixtureFetcher::new();
        let mut backend = InProcessSearcher;
        let mut sink = MemorySink::new();

        run_sweep(
            &plan(false),
            &api,
            "https://gitlab.example.com",
            &fetcher,
            &mut backend,
            &mut sink,
        )
        .unwrap();

        assert_eq!(*fetcher.released.borrow(), vec!["main", "develop"]);
    }

    #[test]
    fn test_list_branches_only_skips_fetch() {
        let api = stub_api(&["main", "develop"]);
        let fetcher = FixtureFetcher::new();
        let mut backend = InProcessSearcher;
        let mut sink = MemorySink::new();

        let summary = run_sweep(
            &plan(true),
            &api,
            "https://gitlab.example.com",
            &fetcher,
            &mut backend,
            &mut sink,
        )
        .unwrap();

        assert_eq!(summary.branches, 2);
        assert_eq!(summary.matches, 0);
        assert!(fetcher.released.borrow().is_empty());
        assert!(sink.branches.is_empty());
        assert!(sink.errors.is_empty());
    }

    #[test]
    fn test_match_lines_are_trimmed() {
        let api = stub_api(&["main"]);
        let fetcher = FixtureFetcher::new();
        let mut backend = InProcessSearcher;
        let mut sink = MemorySink::new();

        run_sweep(
            &plan(false),
            &api,
            "https://gitlab.example.com",
            &fetcher,
            &mut backend,
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.matches.len(), 1);
        assert_eq!(sink.matches[0].line, "// TODO fix");
        assert_eq!(sink.matches[0].line_number, 2);
        assert_eq!(sink.matches[0].file, "app.go");
    }

    #[test]
    fn test_empty_branch_pattern_is_fatal() {
        let api = stub_api(&["main"]);
        let fetcher = FixtureFetcher::new();
        let mut backend = InProcessSearcher;
        let mut sink = MemorySink::new();

        let mut bad = plan(false);
        bad.policy = BranchPolicy::NamePattern {
            pattern: String::new(),
            limit: None,
        };

        let result = run_sweep(
            &bad,
            &api,
            "https://gitlab.example.com",
            &fetcher,
            &mut backend,
            &mut sink,
        );
        assert!(matches!(
            result,
            Err(FatalError::Select(SelectError::EmptyPattern))
        ));
        // Fatal before any cloning.
        assert!(fetcher.released.borrow().is_empty());
    }

    #[test]
    fn test_invalid_file_rule_is_fatal_before_cloning() {
        let api = stub_api(&["main"]);
        let fetcher = FixtureFetcher::new();
        let mut backend = InProcessSearcher;
        let mut sink = MemorySink::new();

        let mut bad = plan(false);
        bad.rule = FileRule::Regex("[unclosed".to_string());

        let result = run_sweep(
            &bad,
            &api,
            "https://gitlab.example.com",
            &fetcher,
            &mut backend,
            &mut sink,
        );
        assert!(matches!(result, Err(FatalError::FileRule(_))));
        assert!(fetcher.released.borrow().is_empty());
    }
}
