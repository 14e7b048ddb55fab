//! Source control for the SDK repository

use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{
    Cred, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks, Repository, Signature,
    Status, StatusOptions,
};
use tracing::info;

use crate::error::Result;
use crate::metadata::GEN_CONFIG_FILE;

const BOT_NAME: &str = "speakeasybot";
const BOT_EMAIL: &str = "bot@speakeasyapi.dev";

/// Clone, inspect and publish the SDK repository
pub trait SourceControl {
    type Handle;

    fn clone_repo(&self) -> Result<Self::Handle>;

    /// Whether anything under `path` changed, ignoring generator config files
    fn is_dirty(&self, handle: &Self::Handle, path: &str) -> Result<bool>;

    /// Commit every change and push the current branch, returning the commit id
    fn commit_and_push(&self, handle: &Self::Handle, message: &str) -> Result<String>;
}

/// A git remote checked out with libgit2
pub struct GitRepository {
    url: String,
    token: String,
    dest: PathBuf,
}

impl GitRepository {
    pub fn new(url: impl Into<String>, token: impl Into<String>, dest: impl AsRef<Path>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            dest: dest.as_ref().to_path_buf(),
        }
    }

    /// `{server}/{repository}.git`
    pub fn github(server_url: &str, repository: &str, token: impl Into<String>, dest: impl AsRef<Path>) -> Self {
        let url = format!("{}/{}.git", server_url.trim_end_matches('/'), repository);
        Self::new(url, token, dest)
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, _username, _allowed| {
            Cred::userpass_plaintext("x-access-token", &self.token)
        });
        callbacks
    }
}

impl SourceControl for GitRepository {
    type Handle = Repository;

    fn clone_repo(&self) -> Result<Repository> {
        if self.dest.join(".git").exists() {
            info!("Using existing checkout at {:?}", self.dest);
            return Ok(Repository::open(&self.dest)?);
        }

        info!("Cloning {} into {:?}", self.url, self.dest);
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(self.callbacks());

        let repo = RepoBuilder::new()
            .fetch_options(fetch)
            .clone(&self.url, &self.dest)?;
        Ok(repo)
    }

    fn is_dirty(&self, repo: &Repository, path: &str) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);

        let pathspec = path.strip_prefix("./").unwrap_or(path);
        if !pathspec.is_empty() && pathspec != "." {
            opts.pathspec(pathspec);
        }

        let statuses = repo.statuses(Some(&mut opts))?;
        let dirty = statuses.iter().any(|entry| {
            let status = entry.status();
            let is_config = entry
                .path()
                .map(|p| p.ends_with(GEN_CONFIG_FILE))
                .unwrap_or(false);
            status != Status::CURRENT && !status.contains(Status::IGNORED) && !is_config
        });

        Ok(dirty)
    }

    fn commit_and_push(&self, repo: &Repository, message: &str) -> Result<String> {
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree = repo.find_tree(index.write_tree()?)?;
        let sig = Signature::now(BOT_NAME, BOT_EMAIL)?;
        let parent = repo.head()?.peel_to_commit()?;

        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;

        let head = repo.head()?;
        let branch = head
            .name()
            .ok_or_else(|| git2::Error::from_str("HEAD is not a named branch"))?;

        let mut push = PushOptions::new();
        push.remote_callbacks(self.callbacks());
        repo.find_remote("origin")?
            .push(&[format!("{branch}:{branch}")], Some(&mut push))?;

        info!("Pushed commit {} to {}", oid, branch);
        Ok(oid.to_string())
    }
}
