use thiserror::Error;

/// Configuration errors. All of these are fatal and abort the run before
/// any cloning begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    ParseYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unsupported config format for {0}: .{1}")]
    UnsupportedFormat(String, String),

    #[error("gitlab.api_url must be set")]
    MissingApiUrl,

    #[error("group.id must be set when mode is group")]
    MissingGroupId,

    #[error("project locator must be set when mode is project")]
    MissingProjectLocator,

    #[error("projects list must be non-empty when mode is project_list")]
    EmptyProjectList,

    #[error("files.pattern must be set when files.rule is regex")]
    MissingFilePattern,

    #[error("files.values must be non-empty for the {0} rule")]
    EmptyFileValues(&'static str),

    #[error("search.target must be non-empty")]
    EmptyTarget,

    #[error("search.external_command must be set when search.backend is external")]
    MissingExternalCommand,
}
