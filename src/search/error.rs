use std::path::PathBuf;
use thiserror::Error;

/// Per-file scan failures. Recovered: logged as an error record, the file
/// is skipped and the rest of the branch is still processed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied reading {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("File is not valid UTF-8: {}", .0.display())]
    Decode(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Search backend error for {}: {message}", path.display())]
    Backend { path: PathBuf, message: String },
}

/// Backend initialization failures. Fatal: the run aborts before any
/// cloning begins.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to start external search backend {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("External search backend did not expose stdio pipes")]
    MissingPipes,

    #[error("External search backend command is empty")]
    EmptyCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::NotFound(PathBuf::from("/repo/src/a.go"));
        assert_eq!(err.to_string(), "File not found: /repo/src/a.go");

        let err = ScanError::Backend {
            path: PathBuf::from("a.go"),
            message: "helper crashed".to_string(),
        };
        assert!(err.to_string().contains("helper crashed"));
    }
}
