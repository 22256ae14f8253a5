//! Blocking HTTP client for the GitLab REST API (v4).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{BranchRef, CommitInfo, Project};
use super::{GitLabApi, COMMIT_WINDOW_PROBE};

/// Page size for listing endpoints (GitLab's maximum).
const PAGE_SIZE: usize = 100;

/// Blocking GitLab API client.
///
/// All calls are synchronous; the pipeline processes one unit at a time and
/// never overlaps network wait with local scanning.
pub struct GitLabClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

impl GitLabClient {
    /// Create a client for `base_url` (e.g. `https://gitlab.example.com`).
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// The configured instance base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/api/v4{}", self.base_url, path);
        let mut req = self.http.get(&url).query(query);
        if let Some(ref token) = self.token {
            req = req.header("PRIVATE-TOKEN", token);
        }

        let resp = req.send().map_err(|e| ApiError::Request {
            url: url.clone(),
            source: e,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(ApiError::Http {
                url,
                status: status.as_u16(),
                message,
            });
        }

        resp.json().map_err(|e| ApiError::Decode { url, source: e })
    }

    /// Fetch every page of a listing endpoint, preserving API order.
    fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let query = [
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let batch: Vec<T> = self.get(path, &query)?;
            let done = batch.len() < PAGE_SIZE;
            all.extend(batch);
            if done {
                return Ok(all);
            }
            page += 1;
        }
    }
}

/// Percent-encode a namespaced project path for use as a URL id.
fn encode_project_path(path: &str) -> String {
    path.replace('/', "%2F")
}

impl GitLabApi for GitLabClient {
    fn list_group_projects(&self, group_id: u64) -> Result<Vec<Project>, ApiError> {
        let path = format!("/groups/{}/projects", group_id);
        self.get_paged(&path).map_err(|e| match e {
            ApiError::Http { status: 404, .. } => ApiError::GroupNotFound(group_id),
            other => other,
        })
    }

    fn project_by_id(&self, id: u64) -> Result<Project, ApiError> {
        let path = format!("/projects/{}", id);
        self.get(&path, &[]).map_err(|e| match e {
            ApiError::Http { status: 404, .. } => ApiError::ProjectNotFound(id.to_string()),
            other => other,
        })
    }

    fn project_by_path(&self, project_path: &str) -> Result<Project, ApiError> {
        let path = format!("/projects/{}", encode_project_path(project_path));
        self.get(&path, &[]).map_err(|e| match e {
            ApiError::Http { status: 404, .. } => {
                ApiError::ProjectNotFound(project_path.to_string())
            }
            other => other,
        })
    }

    fn list_branches(&self, project_id: u64) -> Result<Vec<BranchRef>, ApiError> {
        let path = format!("/projects/{}/repository/branches", project_id);
        self.get_paged(&path)
    }

    fn commits_in_window(
        &self,
        project_id: u64,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ApiError> {
        let path = format!("/projects/{}/repository/commits", project_id);
        // Single bounded call: one probe page, never a full history walk.
        let query = [
            ("ref_name", branch.to_string()),
            ("since", since.to_rfc3339()),
            ("until", until.to_rfc3339()),
            ("per_page", COMMIT_WINDOW_PROBE.to_string()),
        ];
        self.get(&path, &query)
    }
}
