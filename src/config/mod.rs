//! Run configuration: serde types, file loading, and validation into the
//! closed policy/rule enums the pipeline consumes.

pub mod error;
pub mod loading;
pub mod types;

pub use error::ConfigError;
pub use types::{
    BranchConfig, BranchPolicyKind, Config, FileRuleKind, FilesConfig, GitLabConfig, GroupConfig,
    ProjectMatchKind, RunMode, SearchBackendKind, SearchConfig,
};
