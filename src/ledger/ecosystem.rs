//! Package ecosystems that get a release line in the ledger
//!
//! An ecosystem is pure data: a language id, the registry label shown in the
//! release line, and a URL template. Templates use three placeholders:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `{package}` | package name (repository for monorepo ecosystems) |
//! | `{version}` | release version |
//! | `{tag}`     | `v{version}`, prefixed with the SDK subdirectory for monorepo ecosystems |
//!
//! The same template drives both formatting and parsing, so adding an
//! ecosystem is a table entry rather than new parsing code.

use regex::Regex;

use crate::error::{RegenError, Result};
use crate::ledger::LanguageReleaseInfo;

const VERSION_PATTERN: &str = r"\d+\.\d+\.\d+";

/// A package registry a language publishes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecosystem {
    pub language: String,
    pub label: String,
    pub url_template: String,
    /// Package names embed the SDK subdirectory (Go modules in a monorepo)
    pub monorepo_paths: bool,
}

impl Ecosystem {
    pub fn new(
        language: impl Into<String>,
        label: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            label: label.into(),
            url_template: url_template.into(),
            monorepo_paths: false,
        }
    }

    pub fn with_monorepo_paths(mut self) -> Self {
        self.monorepo_paths = true;
        self
    }

    /// Render the release URL for `info`
    pub fn release_url(&self, info: &LanguageReleaseInfo) -> String {
        let subpath = self.subpath(&info.path);

        let (package, tag) = match subpath {
            Some(sub) => {
                let suffix = format!("/{sub}");
                let repo = info.package_name.strip_suffix(&suffix).unwrap_or(&info.package_name);
                (repo.to_string(), format!("{sub}/v{}", info.version))
            }
            None => (info.package_name.clone(), format!("v{}", info.version)),
        };

        self.url_template
            .replace("{package}", &package)
            .replace("{version}", &info.version)
            .replace("{tag}", &tag)
    }

    /// Render the ledger line for `info`
    pub fn release_line(&self, info: &LanguageReleaseInfo) -> String {
        format!(
            "- [{} v{}] {} - {}",
            self.label,
            info.version,
            self.release_url(info),
            info.path
        )
    }

    /// Package name as recorded, given the name captured from the URL and the line's path
    pub fn package_name(&self, captured: &str, path: &str) -> String {
        match self.subpath(path) {
            Some(sub) => format!("{captured}/{sub}"),
            None => captured.to_string(),
        }
    }

    /// Compile the line pattern with named groups `version`, `url`, `package` and `path`
    pub fn line_pattern(&self) -> Result<Regex> {
        if self.url_template.matches("{package}").count() != 1 {
            return Err(RegenError::InvalidEcosystem {
                language: self.language.clone(),
                reason: "url template must contain {package} exactly once".to_string(),
            });
        }

        let url = regex::escape(&self.url_template)
            .replace(r"\{package\}", "(?P<package>.+?)")
            .replace(r"\{version\}", VERSION_PATTERN)
            .replace(r"\{tag\}", &format!("(?:.+/)?v{VERSION_PATTERN}"));

        let pattern = format!(
            r"^- \[{} v(?P<version>{VERSION_PATTERN})\] (?P<url>{url}) - (?P<path>.*)$",
            regex::escape(&self.label),
        );

        Ok(Regex::new(&pattern)?)
    }

    fn subpath<'a>(&self, path: &'a str) -> Option<&'a str> {
        if !self.monorepo_paths || path == "." || path.is_empty() {
            return None;
        }
        Some(path.strip_prefix("./").unwrap_or(path))
    }
}

/// Ordered set of ecosystems, keyed by language id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcosystemTable {
    entries: Vec<Ecosystem>,
}

impl EcosystemTable {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an ecosystem, replacing any existing entry for the same language
    pub fn with(mut self, ecosystem: Ecosystem) -> Self {
        self.entries.retain(|e| e.language != ecosystem.language);
        self.entries.push(ecosystem);
        self
    }

    pub fn get(&self, language: &str) -> Option<&Ecosystem> {
        self.entries.iter().find(|e| e.language == language)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ecosystem> {
        self.entries.iter()
    }
}

impl Default for EcosystemTable {
    /// Go, TypeScript (NPM), Python (PyPI) and PHP (Composer)
    fn default() -> Self {
        Self::empty()
            .with(
                Ecosystem::new("go", "Go", "https://github.com/{package}/releases/tag/{tag}")
                    .with_monorepo_paths(),
            )
            .with(Ecosystem::new(
                "typescript",
                "NPM",
                "https://www.npmjs.com/package/{package}/v/{version}",
            ))
            .with(Ecosystem::new(
                "python",
                "PyPI",
                "https://pypi.org/project/{package}/{version}",
            ))
            .with(Ecosystem::new(
                "php",
                "Composer",
                "https://packagist.org/packages/{package}#v{version}",
            ))
    }
}
