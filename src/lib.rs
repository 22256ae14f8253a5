pub mod cli;
pub mod config;
pub mod discovery;
pub mod gitlab;
pub mod resolver;
pub mod run;
pub mod search;
pub mod selector;
pub mod sink;
pub mod workspace;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use discovery::FileRule;
pub use gitlab::{GitLabApi, GitLabClient, Project};
pub use resolver::{ProjectMode, ProjectResolver};
pub use run::{run_sweep, FatalError, RunSummary, SweepPlan};
pub use search::{build_backend, SearchBackend};
pub use selector::BranchPolicy;
pub use sink::{FileSink, MemorySink, ResultSink};
pub use workspace::{Fetcher, Workspace, WorkspaceFetcher};
