use thiserror::Error;

/// Errors while materializing one (project, branch) checkout. Recovered at
/// the branch boundary: the branch is skipped and the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Git command not found. Please install git.")]
    GitNotFound,

    #[error("Failed to prepare workspace path {path}: {source}")]
    Prepare {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git clone failed for {project}@{branch}: {message}")]
    CloneFailed {
        project: String,
        branch: String,
        message: String,
    },

    #[error("Failed to read branch head in {path}: {message}")]
    Head { path: String, message: String },
}
