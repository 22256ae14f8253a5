//! Project resolution: turns the configured run mode into an ordered list
//! of projects to scan.

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::gitlab::{ApiError, GitLabApi, Project};

/// How group projects are filtered by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    /// No filtering.
    All,
    /// Case-sensitive containment on the project name.
    Substring(String),
    /// Any regex match anywhere in the project name qualifies.
    Regex(String),
}

/// Which projects a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectMode {
    Group {
        /// Absent id is a configuration error surfaced at resolve time.
        group_id: Option<u64>,
        filter: ProjectFilter,
    },
    Single {
        locator: String,
    },
    List {
        locators: Vec<String>,
    },
}

/// Errors during project resolution. All fatal: the run aborts before any
/// cloning begins.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid project name pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Resolves the configured mode into concrete projects via the API
/// collaborator. Read-only; no side effects beyond the listing calls.
pub struct ProjectResolver<'a, A: GitLabApi> {
    api: &'a A,
    base_url: String,
}

impl<'a, A: GitLabApi> ProjectResolver<'a, A> {
    pub fn new(api: &'a A, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the mode into an ordered project list.
    pub fn resolve(&self, mode: &ProjectMode) -> Result<Vec<Project>, ResolveError> {
        match mode {
            ProjectMode::Group { group_id, filter } => {
                let group_id = group_id.ok_or(ConfigError::MissingGroupId)?;
                let projects = self.api.list_group_projects(group_id)?;
                debug!(group_id, total = projects.len(), "Listed group projects");
                let filtered = apply_filter(projects, filter)?;
                info!(
                    selected = filtered.len(),
                    "Projects selected for this run"
                );
                Ok(filtered)
            }
            ProjectMode::Single { locator } => Ok(vec![self.resolve_locator(locator)?]),
            ProjectMode::List { locators } => {
                // Each locator resolves independently, in order; any failure
                // is fatal for the run, never skipped.
                let mut projects = Vec::with_capacity(locators.len());
                for locator in locators {
                    projects.push(self.resolve_locator(locator)?);
                }
                Ok(projects)
            }
        }
    }

    /// Resolve one locator: numeric id, namespaced path, or full URL.
    fn resolve_locator(&self, locator: &str) -> Result<Project, ResolveError> {
        let normalized = self.normalize_locator(locator);
        if normalized.chars().all(|c| c.is_ascii_digit()) && !normalized.is_empty() {
            let id = normalized.parse::<u64>().unwrap_or_default();
            Ok(self.api.project_by_id(id)?)
        } else {
            Ok(self.api.project_by_path(&normalized)?)
        }
    }

    /// A locator given as a full URL is reduced to its project path by
    /// stripping the instance base URL and any leading slash.
    fn normalize_locator(&self, locator: &str) -> String {
        let stripped = locator
            .strip_prefix(&self.base_url)
            .unwrap_or(locator)
            .trim_start_matches('/');
        stripped.trim_end_matches(".git").to_string()
    }
}

/// Apply a name filter, preserving API-returned order.
fn apply_filter(
    projects: Vec<Project>,
    filter: &ProjectFilter,
) -> Result<Vec<Project>, ResolveError> {
    match filter {
        ProjectFilter::All => Ok(projects),
        ProjectFilter::Substring(needle) => Ok(projects
            .into_iter()
            .filter(|p| p.name.contains(needle))
            .collect()),
        ProjectFilter::Regex(pattern) => {
            let re = Regex::new(pattern).map_err(|e| ResolveError::Pattern {
                pattern: pattern.clone(),
                source: e,
            })?;
            // First match anywhere qualifies; never anchored.
            Ok(projects
                .into_iter()
                .filter(|p| re.is_match(&p.name))
                .collect())
        }
    }
}
