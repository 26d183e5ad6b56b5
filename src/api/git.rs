use anyhow::Result;
use tracing::debug;

use super::client::{ApiClient, RAW_MEDIA_TYPE};
use super::types::{
    CreateCommitRequest, CreateRefRequest, CreateRefResponse, CreateTreeRequest, NewTreeEntry,
    RefResponse, ShaResponse, TreeResponse,
};
use super::NewCommit;
use crate::domain::{PatchedTreeEntry, RepoSlug, ResolvedRef, TreeListing};

fn repo_path(repo: &RepoSlug, rest: &str) -> String {
    format!("repos/{}/{}/{}", repo.owner, repo.repo, rest)
}

impl ApiClient {
    /// Resolve a branch name to the object it points at
    pub(super) async fn get_ref(&self, repo: &RepoSlug, branch: &str) -> Result<ResolvedRef> {
        let path = repo_path(repo, &format!("git/ref/heads/{}", branch));
        let response: RefResponse = self.get_json(&path).await?;
        debug!("Resolved {} to {}", response.ref_name, response.object.sha);
        Ok(ResolvedRef {
            object_type: response.object.object_type,
            commit_id: response.object.sha,
        })
    }

    /// Fetch the recursive tree listing of a commit
    pub(super) async fn get_recursive_tree(
        &self,
        repo: &RepoSlug,
        commit_id: &str,
    ) -> Result<TreeListing> {
        let path = repo_path(repo, &format!("git/trees/{}?recursive=1", commit_id));
        let response: TreeResponse = self.get_json(&path).await?;
        Ok(TreeListing {
            tree_id: response.sha,
            entries: response.tree,
            truncated: response.truncated,
        })
    }

    /// Fetch blob bytes using the raw media type (no base64 envelope)
    pub(super) async fn raw_blob(&self, repo: &RepoSlug, sha: &str) -> Result<Vec<u8>> {
        let path = repo_path(repo, &format!("git/blobs/{}", sha));
        self.get_bytes(&path, RAW_MEDIA_TYPE).await
    }

    pub(super) async fn post_tree(
        &self,
        repo: &RepoSlug,
        base_tree_id: &str,
        entries: &[PatchedTreeEntry],
    ) -> Result<String> {
        let body = CreateTreeRequest {
            base_tree: base_tree_id,
            tree: entries
                .iter()
                .map(|e| NewTreeEntry {
                    path: &e.path,
                    mode: &e.mode,
                    entry_type: "blob",
                    content: &e.content,
                })
                .collect(),
        };
        let response: ShaResponse = self.post_json(&repo_path(repo, "git/trees"), &body).await?;
        Ok(response.sha)
    }

    pub(super) async fn post_commit(&self, repo: &RepoSlug, commit: &NewCommit) -> Result<String> {
        let body = CreateCommitRequest {
            message: &commit.message,
            tree: &commit.tree_id,
            parents: commit.parent_ids.iter().map(String::as_str).collect(),
        };
        let response: ShaResponse = self
            .post_json(&repo_path(repo, "git/commits"), &body)
            .await?;
        Ok(response.sha)
    }

    pub(super) async fn post_ref(
        &self,
        repo: &RepoSlug,
        branch: &str,
        commit_id: &str,
    ) -> Result<String> {
        let body = CreateRefRequest {
            ref_name: format!("refs/heads/{}", branch),
            sha: commit_id,
        };
        let response: CreateRefResponse =
            self.post_json(&repo_path(repo, "git/refs"), &body).await?;
        Ok(response.ref_name)
    }
}
