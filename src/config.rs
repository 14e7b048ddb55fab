//! Process configuration
//!
//! Loaded once at startup from, in order of precedence (last wins):
//! - Config file (`sdk-regen.toml`, `.sdk-regen.toml`, XDG config dir)
//! - Action inputs (`INPUT_*`)
//! - Host variables (`GITHUB_*`, `SPEAKEASY_ENVIRONMENT`)
//!
//! ## Example config file (sdk-regen.toml):
//! ```toml
//! openapi_doc_location = "./openapi.yaml"
//! languages = "go, typescript: ./ts"
//! create_release = "true"
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use config_crate::{Config, ConfigBuilder, Environment, File};
use config_crate::builder::DefaultState;
use serde::Deserialize;

use crate::error::{RegenError, Result};
use crate::ledger::LEDGER_FILE;
use crate::metadata::GEN_CONFIG_FILE;

/// Raw values as they arrive from files and the environment
#[derive(Debug, Clone, Default, Deserialize)]
struct RawInputs {
    #[serde(default)]
    debug: String,
    #[serde(default)]
    openapi_doc_location: String,
    #[serde(default)]
    languages: String,
    #[serde(default)]
    create_release: String,
    #[serde(default)]
    github_access_token: String,
    #[serde(default)]
    speakeasy_path: Option<PathBuf>,
    #[serde(default)]
    github_repository: String,
    #[serde(default)]
    github_output: Option<PathBuf>,
    #[serde(default)]
    github_server_url: Option<String>,
    #[serde(default)]
    github_api_url: Option<String>,
    #[serde(default)]
    speakeasy_environment: String,
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub debug: bool,
    pub doc_location: String,
    pub languages: Vec<TargetLanguage>,
    pub create_release: bool,
    pub access_token: String,
    /// Generator binary to invoke
    pub speakeasy_path: PathBuf,
    /// `owner/name` of the SDK repository
    pub repository: String,
    pub server_url: String,
    pub api_url: String,
    /// File receiving step outputs
    pub output_file: Option<PathBuf>,
    pub workspace: Workspace,
}

/// An SDK language and the repository directory it is generated into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLanguage {
    pub language: String,
    pub dir: String,
}

impl ActionConfig {
    /// Load configuration from config files and the process environment
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        for location in ["sdk-regen.toml", ".sdk-regen.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("com", "speakeasy", "sdk-regen") {
            let xdg_config = dirs.config_dir().join("sdk-regen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        Self::build(builder, None)
    }

    /// Load configuration from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(Config::builder(), Some(vars))
    }

    fn build(builder: ConfigBuilder<DefaultState>, vars: Option<HashMap<String, String>>) -> Result<Self> {
        let raw: RawInputs = builder
            .add_source(
                Environment::with_prefix("INPUT")
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars.clone()),
            )
            .add_source(
                Environment::with_prefix("GITHUB")
                    .keep_prefix(true)
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars.clone()),
            )
            .add_source(
                Environment::with_prefix("SPEAKEASY")
                    .keep_prefix(true)
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawInputs) -> Result<Self> {
        if raw.github_access_token.is_empty() {
            return Err(RegenError::MissingInput("github access token".to_string()));
        }

        Ok(Self {
            debug: raw.debug == "true",
            doc_location: raw.openapi_doc_location,
            languages: parse_languages(&raw.languages)?,
            create_release: raw.create_release == "true",
            access_token: raw.github_access_token,
            speakeasy_path: raw.speakeasy_path.unwrap_or_else(|| PathBuf::from("speakeasy")),
            repository: raw.github_repository,
            server_url: raw
                .github_server_url
                .unwrap_or_else(|| "https://github.com".to_string()),
            api_url: raw
                .github_api_url
                .unwrap_or_else(|| "https://api.github.com".to_string()),
            output_file: raw.github_output,
            workspace: Workspace::for_environment(&raw.speakeasy_environment),
        })
    }
}

/// Parse the target language list.
///
/// Entries are separated by commas or newlines and are either `lang` or
/// `lang: dir`; YAML list dashes are tolerated. Without an explicit directory a
/// lone language is generated at the repository root and multiple languages
/// each get `./{lang}`.
pub fn parse_languages(input: &str) -> Result<Vec<TargetLanguage>> {
    let entries: Vec<(String, Option<String>)> = input
        .split([',', '\n'])
        .map(str::trim)
        .map(|entry| entry.strip_prefix("- ").unwrap_or(entry).trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((lang, dir)) => {
                let dir = dir.trim();
                (lang.trim().to_lowercase(), (!dir.is_empty()).then(|| dir.to_string()))
            }
            None => (entry.to_lowercase(), None),
        })
        .collect();

    if entries.is_empty() {
        return Err(RegenError::MissingInput("languages".to_string()));
    }

    let mut seen = BTreeSet::new();
    let single = entries.len() == 1;
    entries
        .into_iter()
        .map(|(language, dir)| {
            if !seen.insert(language.clone()) {
                return Err(RegenError::InvalidInput {
                    name: "languages".to_string(),
                    reason: format!("{language} listed more than once"),
                });
            }
            let dir = dir.unwrap_or_else(|| {
                if single {
                    ".".to_string()
                } else {
                    format!("./{language}")
                }
            });
            Ok(TargetLanguage { language, dir })
        })
        .collect()
}

/// Root of every path the regenerator touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    base: PathBuf,
}

impl Workspace {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// `/` on a runner, `./` when `SPEAKEASY_ENVIRONMENT=local`
    pub fn for_environment(environment: &str) -> Self {
        if environment == "local" {
            Self::new("./")
        } else {
            Self::new("/")
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Checkout of the SDK repository
    pub fn repo_dir(&self) -> PathBuf {
        self.base.join("repo")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.repo_dir().join(LEDGER_FILE)
    }

    /// Directory an SDK is generated into
    pub fn sdk_dir(&self, dir: &str) -> PathBuf {
        self.repo_dir().join(dir)
    }

    pub fn gen_config_path(&self, dir: &str) -> PathBuf {
        self.sdk_dir(dir).join(GEN_CONFIG_FILE)
    }

    /// Where remote OpenAPI documents are downloaded
    pub fn download_dir(&self) -> PathBuf {
        self.base.join("openapi")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_from_vars() {
        let config = ActionConfig::from_vars(vars(&[
            ("INPUT_DEBUG", "true"),
            ("INPUT_OPENAPI_DOC_LOCATION", "./openapi.yaml"),
            ("INPUT_LANGUAGES", "go\ntypescript: ./ts"),
            ("INPUT_CREATE_RELEASE", "false"),
            ("INPUT_GITHUB_ACCESS_TOKEN", "secret"),
            ("GITHUB_REPOSITORY", "acme/sdk"),
            ("GITHUB_OUTPUT", "/tmp/out"),
            ("SPEAKEASY_ENVIRONMENT", "local"),
        ]))
        .unwrap();

        assert!(config.debug);
        assert!(!config.create_release);
        assert_eq!(config.doc_location, "./openapi.yaml");
        assert_eq!(config.repository, "acme/sdk");
        assert_eq!(config.access_token, "secret");
        assert_eq!(config.output_file, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.speakeasy_path, PathBuf::from("speakeasy"));
        assert_eq!(config.workspace, Workspace::new("./"));
        assert_eq!(
            config.languages,
            vec![
                TargetLanguage { language: "go".into(), dir: "./go".into() },
                TargetLanguage { language: "typescript".into(), dir: "./ts".into() },
            ]
        );
    }

    #[test]
    fn test_access_token_required() {
        let result = ActionConfig::from_vars(vars(&[("INPUT_LANGUAGES", "go")]));
        assert!(matches!(result, Err(RegenError::MissingInput(_))));
    }

    #[test]
    fn test_single_language_at_root() {
        let langs = parse_languages("- python").unwrap();
        assert_eq!(langs, vec![TargetLanguage { language: "python".into(), dir: ".".into() }]);
    }

    #[test]
    fn test_language_list_errors() {
        assert!(matches!(parse_languages(" \n, "), Err(RegenError::MissingInput(_))));
        assert!(matches!(
            parse_languages("go, Go"),
            Err(RegenError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_workspace_paths() {
        let ws = Workspace::for_environment("");
        assert_eq!(ws.base(), Path::new("/"));
        assert_eq!(ws.ledger_path(), PathBuf::from("/repo/RELEASES.md"));
        assert_eq!(ws.gen_config_path("./go"), PathBuf::from("/repo/./go/gen.yaml"));
    }
}
