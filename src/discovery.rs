//! File enumeration: walks one workspace and yields relative paths matching
//! the configured file-selection rule.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// File-selection rule, applied to file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRule {
    /// Every non-hidden file.
    All,
    /// File name contains any of the tokens.
    Substring(Vec<String>),
    /// File name ends with any of the extensions.
    Extension(Vec<String>),
    /// File name has at least one regex match.
    Regex(String),
}

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("Invalid file name pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Reject rule parameters that are known bad before any cloning happens.
pub fn validate(rule: &FileRule) -> Result<(), EnumerateError> {
    if let FileRule::Regex(pattern) = rule {
        Regex::new(pattern).map_err(|e| EnumerateError::Pattern {
            pattern: pattern.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// Entries whose name starts with the hidden marker are pruned, which also
/// keeps the walk out of `.git`.
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Walk `root` and return matching file paths relative to it, in traversal
/// order. One finite pass per call; this order becomes the processing order
/// for the branch.
pub fn enumerate(root: &Path, rule: &FileRule) -> Result<Vec<PathBuf>, EnumerateError> {
    let name_regex = match rule {
        FileRule::Regex(pattern) => {
            Some(
                Regex::new(pattern).map_err(|e| EnumerateError::Pattern {
                    pattern: pattern.clone(),
                    source: e,
                })?,
            )
        }
        _ => None,
    };

    let files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            match rule {
                FileRule::All => true,
                FileRule::Substring(tokens) => tokens.iter().any(|t| name.contains(t)),
                FileRule::Extension(exts) => exts.iter().any(|ext| name.ends_with(ext)),
                FileRule::Regex(_) => name_regex.as_ref().is_some_and(|re| re.is_match(name)),
            }
        })
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|rel| rel.to_path_buf())
        })
        .collect();

    Ok(files)
}
