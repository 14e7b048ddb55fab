//! OpenAPI document info: where it lives, its checksum and its declared version

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info};

use crate::checksum::Checksum;
use crate::config::Workspace;
use crate::error::Result;

/// The document a run generates from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocInfo {
    /// Local path handed to the generator
    pub path: PathBuf,
    pub checksum: Checksum,
    /// `info.version`, empty when the document does not declare one
    pub version: String,
}

impl DocInfo {
    /// Resolve `location` (URL or path relative to the repository checkout) and read it
    pub fn load(location: &str, workspace: &Workspace) -> Result<Self> {
        let path = if is_remote(location) {
            download(location, &workspace.download_dir())?
        } else {
            workspace.repo_dir().join(location)
        };

        Self::from_file(path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path)?;
        let checksum = Checksum::from_bytes(&data);
        let version = declared_version(&String::from_utf8_lossy(&data))?;
        debug!("OpenAPI doc {:?}: version '{}', checksum {}", path, version, checksum);

        Ok(Self {
            path,
            checksum,
            version,
        })
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn download(url: &str, dir: &Path) -> Result<PathBuf> {
    info!("Downloading OpenAPI doc from {}", url);
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let body = response.bytes()?;

    let file_name = url
        .split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("openapi.yaml");

    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, &body)?;
    Ok(path)
}

/// Extract `info.version` from a JSON or YAML document.
///
/// JSON is read as YAML. A document without `info.version` yields an empty
/// string; numeric versions (`version: 2.1`) are returned as written.
pub fn declared_version(content: &str) -> Result<String> {
    let doc: Value = serde_yaml::from_str(content)?;

    let version = match doc.get("info").and_then(|info| info.get("version")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Ok(version)
}
