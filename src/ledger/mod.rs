//! Release Ledger
//!
//! An append-only markdown file (`RELEASES.md`) with one block per release.
//! Humans read it as a changelog; the regenerator reads back only the newest
//! block to build release notes.
//!
//! ```text
//!
//!
//! ## 2024-02-01 09:30:12
//! ### Changes
//! Based on:
//! - OpenAPI Doc 1.0.0 ./openapi.yaml
//! - Speakeasy CLI 1.20.0 https://github.com/speakeasy-api/speakeasy
//! ### Releases
//! - [Go v1.2.0] https://github.com/acme/sdk/releases/tag/v1.2.0 - .
//! ```

pub mod ecosystem;
pub mod format;
pub mod parse;

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use ecosystem::{Ecosystem, EcosystemTable};
pub use format::format_record;
pub use parse::parse_last;

use crate::error::Result;

/// File name of the ledger inside the repository
pub const LEDGER_FILE: &str = "RELEASES.md";

/// Release details for one SDK language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageReleaseInfo {
    pub package_name: String,
    pub path: String,
    pub version: String,
    pub url: String,
}

impl LanguageReleaseInfo {
    pub fn new(package_name: impl Into<String>, path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            path: path.into(),
            version: version.into(),
            url: String::new(),
        }
    }
}

/// One release block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub title: String,
    pub doc_version: String,
    pub doc_location: String,
    pub tool_version: String,
    /// Keyed by language id (`go`, `typescript`, ...)
    pub languages: BTreeMap<String, LanguageReleaseInfo>,
}

/// The ledger file
#[derive(Debug, Clone)]
pub struct ReleaseLedger {
    path: PathBuf,
    ecosystems: EcosystemTable,
}

impl ReleaseLedger {
    /// Open the ledger at `path` with the default ecosystems; the file need not exist yet
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ecosystems: EcosystemTable::default(),
        }
    }

    pub fn with_ecosystems(mut self, ecosystems: EcosystemTable) -> Self {
        self.ecosystems = ecosystems;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a block for `record`, creating the file if needed.
    ///
    /// Earlier blocks are never touched or checked.
    pub fn append(&self, record: &ReleaseRecord) -> Result<()> {
        let block = format_record(record, &self.ecosystems);

        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(block.as_bytes())?;
        Ok(())
    }

    /// Parse the newest block
    pub fn read_last(&self) -> Result<ReleaseRecord> {
        let text = fs::read_to_string(&self.path)?;
        parse_last(&text, &self.ecosystems)
    }
}
