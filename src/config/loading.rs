//! Configuration loading functions.

use std::fs;
use std::path::Path;

use super::error::ConfigError;
use super::types::Config;

impl Config {
    /// Load configuration from a file, dispatching on extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.display().to_string(),
                source: e,
            }),
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
                path: path.display().to_string(),
                source: e,
            }),
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::ParseToml {
                path: path.display().to_string(),
                source: e,
            }),
            _ => Err(ConfigError::UnsupportedFormat(
                path.display().to_string(),
                ext,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BranchPolicyKind, RunMode, SearchBackendKind};
    use std::fs;
    use tempfile::TempDir;

    const YAML: &str = r#"
gitlab:
  api_url: https://gitlab.example.com
mode: group
group:
  id: 42
  project_match: substring
  project_match_value: service
branches:
  policy: name_pattern
  pattern: "release/.*"
  limit: 3
files:
  rule: extension
  values: [".go", ".js"]
search:
  target: "TODO"
  backend: in_process
"#;

    #[test]
    fn test_from_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gitsweep.yaml");
        fs::write(&path, YAML).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mode, RunMode::Group);
        assert_eq!(config.group.id, Some(42));
        assert_eq!(config.branches.policy, BranchPolicyKind::NamePattern);
        assert_eq!(config.branches.limit, 3);
        assert_eq!(config.files.values, vec![".go", ".js"]);
        assert_eq!(config.search.target, "TODO");
        assert_eq!(config.search.backend, SearchBackendKind::InProcess);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gitsweep.toml");
        fs::write(
            &path,
            r#"
mode = "project"
project = "team/service"

[gitlab]
api_url = "https://gitlab.example.com"

[search]
target = "deprecatedCall("
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mode, RunMode::Project);
        assert_eq!(config.project, "team/service");
        assert_eq!(config.search.target, "deprecatedCall(");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gitsweep.ini");
        fs::write(&path, "whatever").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::UnsupportedFormat(..))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/gitsweep.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
