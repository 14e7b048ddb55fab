//! Management metadata and the per-language generator config store
//!
//! Each SDK directory carries the generator's own `gen.yaml`. The regenerator
//! keeps the snapshot of inputs that produced the last generation in it, and
//! writes the SDK version there before the generator runs so the generated
//! package carries it:
//!
//! ```yaml
//! management:
//!   speakeasy-version: 1.20.0
//!   openapi-version: 1.0.0
//!   openapi-checksum: 9f86d08...
//! go:
//!   version: 1.2.0
//!   packageName: github.com/acme/sdk
//! ```
//!
//! Keys the regenerator does not own are carried through untouched, in order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{RegenError, Result};

/// File name of the generator config inside an SDK directory
pub const GEN_CONFIG_FILE: &str = "gen.yaml";

const MANAGEMENT: &str = "management";
const DEFAULT_SDK_VERSION: &str = "0.0.0";

/// Snapshot of the inputs that produced the last generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementMetadata {
    /// Version of the generator binary
    #[serde(rename = "speakeasy-version", default)]
    pub tool_version: String,
    /// `info.version` of the OpenAPI document (may not be semver)
    #[serde(rename = "openapi-version", default)]
    pub doc_version: String,
    /// Checksum of the OpenAPI document
    #[serde(rename = "openapi-checksum", default)]
    pub doc_checksum: String,
}

impl ManagementMetadata {
    pub fn new(
        tool_version: impl Into<String>,
        doc_version: impl Into<String>,
        doc_checksum: impl Into<String>,
    ) -> Self {
        Self {
            tool_version: tool_version.into(),
            doc_version: doc_version.into(),
            doc_checksum: doc_checksum.into(),
        }
    }
}

/// Generator config for one SDK directory
#[derive(Debug, Clone)]
pub struct GenConfig {
    path: PathBuf,
    root: Mapping,
}

impl GenConfig {
    /// Load the config at `path`, treating a missing or empty file as empty
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let root = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Value>(&content)? {
                Value::Mapping(root) => root,
                Value::Null => Mapping::new(),
                _ => {
                    return Err(RegenError::InvalidInput {
                        name: path.display().to_string(),
                        reason: "generator config must be a mapping".to_string(),
                    })
                }
            }
        } else {
            Mapping::new()
        };

        Ok(Self { path, root })
    }

    /// Load `gen.yaml` from an SDK directory
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(dir.as_ref().join(GEN_CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `management` snapshot; absent keys read as empty strings
    pub fn management(&self) -> ManagementMetadata {
        let section = self.section(MANAGEMENT);
        ManagementMetadata {
            tool_version: string_key(section, "speakeasy-version").unwrap_or_default(),
            doc_version: string_key(section, "openapi-version").unwrap_or_default(),
            doc_checksum: string_key(section, "openapi-checksum").unwrap_or_default(),
        }
    }

    pub fn set_management(&mut self, metadata: &ManagementMetadata) {
        let section = self.section_mut(MANAGEMENT);
        section.insert("speakeasy-version".into(), metadata.tool_version.as_str().into());
        section.insert("openapi-version".into(), metadata.doc_version.as_str().into());
        section.insert("openapi-checksum".into(), metadata.doc_checksum.as_str().into());
    }

    /// Current SDK version for `language`, `0.0.0` when never generated
    pub fn sdk_version(&self, language: &str) -> String {
        string_key(self.section(language), "version")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SDK_VERSION.to_string())
    }

    pub fn set_sdk_version(&mut self, language: &str, version: &str) {
        self.section_mut(language)
            .insert("version".into(), version.into());
    }

    /// Published package name for `language`, if configured
    pub fn package_name(&self, language: &str) -> Option<String> {
        string_key(self.section(language), "packageName").filter(|name| !name.is_empty())
    }

    /// Write the config back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(&self.root)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn section(&self, name: &str) -> Option<&Mapping> {
        self.root.get(name).and_then(Value::as_mapping)
    }

    fn section_mut(&mut self, name: &str) -> &mut Mapping {
        let entry = self
            .root
            .entry(name.into())
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        match entry {
            Value::Mapping(section) => section,
            _ => unreachable!("section was just replaced with a mapping"),
        }
    }
}

/// Scalars are read as text, so an unquoted `version: 1.2` still reads back
fn string_key(section: Option<&Mapping>, key: &str) -> Option<String> {
    match section?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
