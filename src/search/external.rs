//! External search backend.
//!
//! Delegates each `(filePath, target)` pair to a helper process speaking
//! newline-delimited JSON on stdio. The helper is spawned once per run and
//! reused for every file; it is torn down when the searcher is dropped.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::debug;

use super::error::{BackendError, ScanError};
use super::{MatchedLine, SearchBackend};

/// One request line sent to the helper.
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    #[serde(rename = "FilePath")]
    file_path: &'a str,
    #[serde(rename = "Target")]
    target: &'a str,
}

/// One response line read back from the helper.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(rename = "MatchedLines", default)]
    matched_lines: Vec<WireLine>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLine {
    #[serde(rename = "LineNumber")]
    line_number: usize,
    #[serde(rename = "Line")]
    line: String,
}

/// Long-lived handle to the helper process.
pub struct ExternalSearcher {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ExternalSearcher {
    /// Spawn the helper from a program-plus-args command line.
    pub fn spawn(command: &[String]) -> Result<Self, BackendError> {
        let (program, args) = command.split_first().ok_or(BackendError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::Spawn {
                command: command.join(" "),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or(BackendError::MissingPipes)?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or(BackendError::MissingPipes)?;

        debug!(program, "External search backend started");
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    fn exchange(&mut self, request: &WireRequest) -> Result<WireResponse, String> {
        let line = serde_json::to_string(request).map_err(|e| e.to_string())?;
        writeln!(self.stdin, "{}", line).map_err(|e| e.to_string())?;
        self.stdin.flush().map_err(|e| e.to_string())?;

        let mut reply = String::new();
        let read = self.stdout.read_line(&mut reply).map_err(|e| e.to_string())?;
        if read == 0 {
            return Err("backend closed its output stream".to_string());
        }
        serde_json::from_str(&reply).map_err(|e| format!("malformed backend reply: {}", e))
    }
}

impl SearchBackend for ExternalSearcher {
    fn search(&mut self, path: &Path, target: &str) -> Result<Vec<MatchedLine>, ScanError> {
        let request = WireRequest {
            file_path: &path.to_string_lossy(),
            target,
        };

        let response = self.exchange(&request).map_err(|message| ScanError::Backend {
            path: path.to_path_buf(),
            message,
        })?;

        // A present error always implies no matches are reported.
        if let Some(message) = response.error {
            return Err(ScanError::Backend {
                path: path.to_path_buf(),
                message,
            });
        }

        Ok(response
            .matched_lines
            .into_iter()
            .map(|l| MatchedLine {
                line_number: l.line_number,
                line: l.line,
            })
            .collect())
    }
}

impl Drop for ExternalSearcher {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
