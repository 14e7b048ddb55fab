//! Error types for SDK regeneration

use thiserror::Error;

/// Result type for regeneration operations
pub type Result<T, E = RegenError> = std::result::Result<T, E>;

/// Regeneration errors
#[derive(Error, Debug)]
pub enum RegenError {
    #[error("error parsing {field} '{value}': {source}")]
    InvalidVersion {
        field: &'static str,
        value: String,
        #[source]
        source: semver::Error,
    },

    #[error("releases ledger is empty")]
    EmptyLedger,

    #[error("malformed last release record: {0}")]
    MalformedRelease(String),

    #[error("invalid ecosystem '{language}': {reason}")]
    InvalidEcosystem { language: String, reason: String },

    #[error("error generating {language} sdk: {output}")]
    Generator { language: String, output: String },

    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("invalid input {name}: {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("release API returned {status}: {body}")]
    ReleaseRejected { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
