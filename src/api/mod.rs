//! Remote repository access.
//!
//! `RepoHost` is the capability the workflow consumes: branch resolution,
//! tree and blob reads, and the object creations that turn a changeset into
//! a pull request. `ApiClient` implements it over the GitHub REST API.

mod client;
mod git;
mod http;
mod pulls;
mod types;

pub use client::ApiClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Fork, PatchedTreeEntry, RepoSlug, ResolvedRef, TreeListing};

/// Commit to create on top of an existing tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    pub message: String,
    pub tree_id: String,
    pub parent_ids: Vec<String>,
}

/// Pull request to open against the upstream repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    /// `<fork-owner>:<branch>`
    pub head: String,
    pub base: String,
    pub body: String,
}

/// Operations the workflow needs from the hosting service.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Resolve `refs/heads/<branch>` to the object it points at.
    async fn resolve_ref(&self, repo: &RepoSlug, branch: &str) -> Result<ResolvedRef>;

    /// Fetch the full recursive tree of a commit.
    async fn get_tree(&self, repo: &RepoSlug, commit_id: &str) -> Result<TreeListing>;

    /// Fetch the raw bytes of a blob.
    async fn get_raw_blob(&self, repo: &RepoSlug, sha: &str) -> Result<Vec<u8>>;

    async fn create_fork(&self, repo: &RepoSlug) -> Result<Fork>;

    /// Create a tree from `base_tree_id` with `entries` overriding it. Returns the new tree id.
    async fn create_tree(
        &self,
        repo: &RepoSlug,
        base_tree_id: &str,
        entries: &[PatchedTreeEntry],
    ) -> Result<String>;

    /// Returns the new commit id.
    async fn create_commit(&self, repo: &RepoSlug, commit: &NewCommit) -> Result<String>;

    /// Create `refs/heads/<branch>` at `commit_id`. Returns the full ref name.
    async fn create_branch(&self, repo: &RepoSlug, branch: &str, commit_id: &str)
        -> Result<String>;

    /// Returns the pull request's web URL.
    async fn create_pull_request(&self, repo: &RepoSlug, pr: &NewPullRequest) -> Result<String>;
}

#[async_trait]
impl RepoHost for ApiClient {
    async fn resolve_ref(&self, repo: &RepoSlug, branch: &str) -> Result<ResolvedRef> {
        self.get_ref(repo, branch).await
    }

    async fn get_tree(&self, repo: &RepoSlug, commit_id: &str) -> Result<TreeListing> {
        self.get_recursive_tree(repo, commit_id).await
    }

    async fn get_raw_blob(&self, repo: &RepoSlug, sha: &str) -> Result<Vec<u8>> {
        self.raw_blob(repo, sha).await
    }

    async fn create_fork(&self, repo: &RepoSlug) -> Result<Fork> {
        self.fork(repo).await
    }

    async fn create_tree(
        &self,
        repo: &RepoSlug,
        base_tree_id: &str,
        entries: &[PatchedTreeEntry],
    ) -> Result<String> {
        self.post_tree(repo, base_tree_id, entries).await
    }

    async fn create_commit(&self, repo: &RepoSlug, commit: &NewCommit) -> Result<String> {
        self.post_commit(repo, commit).await
    }

    async fn create_branch(
        &self,
        repo: &RepoSlug,
        branch: &str,
        commit_id: &str,
    ) -> Result<String> {
        self.post_ref(repo, branch, commit_id).await
    }

    async fn create_pull_request(&self, repo: &RepoSlug, pr: &NewPullRequest) -> Result<String> {
        self.open_pull_request(repo, pr).await
    }
}
