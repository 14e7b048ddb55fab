//! Invoking the external SDK generator

use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use semver::Version;
use tracing::debug;

use crate::error::{RegenError, Result};
use crate::version::parse_required;

/// Something that can generate an SDK
pub trait Generator {
    /// Version of the generator itself
    fn tool_version(&self) -> Result<Version>;

    /// Generate the `language` SDK for `doc` into `out_dir`, returning the tool's output
    fn generate(&self, doc: &Path, language: &str, out_dir: &Path) -> Result<String>;
}

/// The `speakeasy` CLI
#[derive(Debug, Clone)]
pub struct SpeakeasyCli {
    binary: PathBuf,
}

impl SpeakeasyCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[&str]) -> std::result::Result<String, String> {
        debug!("running {:?} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run {:?}: {}", self.binary, e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(text)
        } else {
            Err(format!("{} - {}", output.status, text))
        }
    }
}

impl Generator for SpeakeasyCli {
    fn tool_version(&self) -> Result<Version> {
        let out = self.run(&["--version"]).map_err(|output| RegenError::Generator {
            language: "any".to_string(),
            output,
        })?;
        debug!("{}", out);
        parse_tool_version(&out)
    }

    fn generate(&self, doc: &Path, language: &str, out_dir: &Path) -> Result<String> {
        let doc = doc.to_string_lossy();
        let out_dir = out_dir.to_string_lossy();

        self.run(&["generate", "sdk", "-s", &doc, "-l", language, "-o", &out_dir, "-y"])
            .map_err(|output| RegenError::Generator {
                language: language.to_string(),
                output,
            })
    }
}

/// Pull the trailing `x.y.z` out of `--version` output
pub fn parse_tool_version(output: &str) -> Result<Version> {
    let re = Regex::new(r"([0-9]+\.[0-9]+\.[0-9]+)$")?;
    let trimmed = output.trim();

    let found = re
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    parse_required("speakeasy version", found)
}
