//! Step outputs, appended as `key=value` lines to the file named by `GITHUB_OUTPUT`

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutputs {
    values: BTreeMap<String, String>,
}

impl StepOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        for (key, value) in &self.values {
            info!("output {}={}", key, value);
            writeln!(file, "{key}={value}")?;
        }
        Ok(())
    }
}
