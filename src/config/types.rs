//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discovery::FileRule;
use crate::resolver::{ProjectFilter, ProjectMode};
use crate::selector::BranchPolicy;

use super::error::ConfigError;

/// Top-level run mode: which projects are in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Every project under a GitLab group, optionally filtered by name.
    #[default]
    Group,
    /// One project, located by id or path.
    Project,
    /// An explicit list of project locators.
    ProjectList,
}

/// How group projects are filtered by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectMatchKind {
    #[default]
    All,
    Substring,
    Regex,
}

/// Branch selection policy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicyKind {
    #[default]
    All,
    NamePattern,
    RecentCommit,
}

/// File-selection rule tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRuleKind {
    #[default]
    All,
    Substring,
    Extension,
    Regex,
}

/// Which search backend scans file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackendKind {
    #[default]
    InProcess,
    External,
}

/// GitLab instance connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// Instance base URL, e.g. `https://gitlab.example.com`.
    pub api_url: String,
    /// Private token. Falls back to the `GITLAB_TOKEN` env var when unset.
    pub token: Option<String>,
}

impl GitLabConfig {
    /// Effective token: config value first, then `GITLAB_TOKEN`.
    pub fn effective_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("GITLAB_TOKEN").ok())
    }
}

/// Group-mode settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Numeric group id. Required in group mode.
    pub id: Option<u64>,
    /// How project names are filtered.
    pub project_match: ProjectMatchKind,
    /// Substring or regex to filter project names with.
    pub project_match_value: String,
}

/// Branch selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    pub policy: BranchPolicyKind,
    /// Regex for `name_pattern`; matches anywhere in the branch name.
    pub pattern: String,
    /// Window for `recent_commit`, in days.
    pub window_days: i64,
    /// Max branches to process after filtering/sorting. `0` or negative
    /// means no restriction.
    pub limit: i64,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            policy: BranchPolicyKind::All,
            pattern: String::new(),
            window_days: DEFAULT_WINDOW_DAYS,
            limit: 0,
        }
    }
}

/// Default recent-commit window when unset or non-positive.
pub const DEFAULT_WINDOW_DAYS: i64 = 15;

/// File-selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub rule: FileRuleKind,
    /// Name substrings or extensions, depending on the rule.
    pub values: Vec<String>,
    /// File-name regex for the `regex` rule.
    pub pattern: String,
}

/// Content-search settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Literal string to search for, line by line.
    pub target: String,
    pub backend: SearchBackendKind,
    /// Command line for the external backend (program + args).
    pub external_command: Vec<String>,
}

/// Main configuration structure for gitsweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gitlab: GitLabConfig,
    pub mode: RunMode,
    pub group: GroupConfig,
    /// Single-project locator (id, path, or full URL).
    pub project: String,
    /// Project locators for `project_list` mode.
    pub projects: Vec<String>,
    pub branches: BranchConfig,
    pub files: FilesConfig,
    pub search: SearchConfig,
    /// Directory ephemeral branch checkouts are created under.
    pub workspace_dir: PathBuf,
    /// Directory the result sink writes to.
    pub log_dir: PathBuf,
    /// Log selected branch names only; skip fetch and scan entirely.
    pub list_branches_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gitlab: GitLabConfig::default(),
            mode: RunMode::default(),
            group: GroupConfig::default(),
            project: String::new(),
            projects: Vec::new(),
            branches: BranchConfig::default(),
            files: FilesConfig::default(),
            search: SearchConfig::default(),
            workspace_dir: PathBuf::from("workspaces"),
            log_dir: PathBuf::from("log"),
            list_branches_only: false,
        }
    }
}

impl Config {
    /// Check settings that every run needs, regardless of mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gitlab.api_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if !self.list_branches_only {
            if self.search.target.is_empty() {
                return Err(ConfigError::EmptyTarget);
            }
            if self.search.backend == SearchBackendKind::External
                && self.search.external_command.is_empty()
            {
                return Err(ConfigError::MissingExternalCommand);
            }
        }
        Ok(())
    }

    /// Build the project-selection mode from the raw config.
    pub fn project_mode(&self) -> Result<ProjectMode, ConfigError> {
        match self.mode {
            RunMode::Group => {
                let filter = match self.group.project_match {
                    ProjectMatchKind::All => ProjectFilter::All,
                    ProjectMatchKind::Substring => {
                        ProjectFilter::Substring(self.group.project_match_value.clone())
                    }
                    ProjectMatchKind::Regex => {
                        ProjectFilter::Regex(self.group.project_match_value.clone())
                    }
                };
                Ok(ProjectMode::Group {
                    group_id: self.group.id,
                    filter,
                })
            }
            RunMode::Project => {
                if self.project.trim().is_empty() {
                    return Err(ConfigError::MissingProjectLocator);
                }
                Ok(ProjectMode::Single {
                    locator: self.project.clone(),
                })
            }
            RunMode::ProjectList => {
                if self.projects.is_empty() {
                    return Err(ConfigError::EmptyProjectList);
                }
                Ok(ProjectMode::List {
                    locators: self.projects.clone(),
                })
            }
        }
    }

    /// Build the branch-selection policy. The empty-pattern check belongs
    /// to the selector, not here.
    pub fn branch_policy(&self) -> BranchPolicy {
        match self.branches.policy {
            BranchPolicyKind::All => BranchPolicy::All,
            BranchPolicyKind::NamePattern => BranchPolicy::NamePattern {
                pattern: self.branches.pattern.clone(),
                limit: limit_opt(self.branches.limit),
            },
            BranchPolicyKind::RecentCommit => BranchPolicy::RecentCommit {
                window_days: if self.branches.window_days > 0 {
                    self.branches.window_days
                } else {
                    DEFAULT_WINDOW_DAYS
                },
                limit: limit_opt(self.branches.limit),
            },
        }
    }

    /// Build the file-selection rule.
    pub fn file_rule(&self) -> Result<FileRule, ConfigError> {
        match self.files.rule {
            FileRuleKind::All => Ok(FileRule::All),
            FileRuleKind::Substring => {
                if self.files.values.is_empty() {
                    return Err(ConfigError::EmptyFileValues("substring"));
                }
                Ok(FileRule::Substring(self.files.values.clone()))
            }
            FileRuleKind::Extension => {
                if self.files.values.is_empty() {
                    return Err(ConfigError::EmptyFileValues("extension"));
                }
                Ok(FileRule::Extension(self.files.values.clone()))
            }
            FileRuleKind::Regex => {
                if self.files.pattern.is_empty() {
                    return Err(ConfigError::MissingFilePattern);
                }
                Ok(FileRule::Regex(self.files.pattern.clone()))
            }
        }
    }
}

/// `0` or negative means "process all that matched".
fn limit_opt(limit: i64) -> Option<usize> {
    if limit > 0 {
        Some(limit as usize)
    } else {
        None
    }
}
