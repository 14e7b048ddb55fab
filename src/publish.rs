//! Publishing releases on the hosting provider

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Serialize;
use tracing::info;

use crate::error::{RegenError, Result};
use crate::ledger::{format_record, EcosystemTable, ReleaseRecord};

/// Creates a release for a pushed commit
pub trait ReleasePublisher {
    fn create_release(&self, version: &str, commit: &str, record: &ReleaseRecord) -> Result<()>;
}

/// Request body for `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
}

impl ReleaseRequest {
    /// Release notes are the ledger block for `record`
    pub fn new(version: &str, commit: &str, record: &ReleaseRecord, ecosystems: &EcosystemTable) -> Self {
        Self {
            tag_name: format!("v{version}"),
            target_commitish: commit.to_string(),
            name: format!("v{version} - {}", record.title),
            body: format_record(record, ecosystems).trim_start().to_string(),
        }
    }
}

/// GitHub releases API
pub struct GithubReleases {
    client: Client,
    api_url: String,
    repository: String,
    token: String,
    ecosystems: EcosystemTable,
}

impl GithubReleases {
    pub fn new(api_url: impl Into<String>, repository: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            repository: repository.into(),
            token: token.into(),
            ecosystems: EcosystemTable::default(),
        }
    }

    pub fn with_ecosystems(mut self, ecosystems: EcosystemTable) -> Self {
        self.ecosystems = ecosystems;
        self
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/releases",
            self.api_url.trim_end_matches('/'),
            self.repository
        )
    }
}

impl ReleasePublisher for GithubReleases {
    fn create_release(&self, version: &str, commit: &str, record: &ReleaseRecord) -> Result<()> {
        let request = ReleaseRequest::new(version, commit, record, &self.ecosystems);
        info!("Creating release {} for {}", request.tag_name, commit);

        let response = self
            .client
            .post(self.releases_url())
            .bearer_auth(&self.token)
            .header(USER_AGENT, "sdk-regen")
            .header(ACCEPT, "application/vnd.github+json")
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegenError::ReleaseRejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(())
    }
}
