use anyhow::Result;

use super::client::ApiClient;
use super::types::{CreatePullRequest, ForkResponse, PullRequestResponse};
use super::NewPullRequest;
use crate::domain::{Fork, RepoSlug};

impl ApiClient {
    /// Fork a repository into the authenticated account
    pub(super) async fn fork(&self, repo: &RepoSlug) -> Result<Fork> {
        let path = format!("repos/{}/{}/forks", repo.owner, repo.repo);
        let response: ForkResponse = self.post_json(&path, &serde_json::json!({})).await?;
        Ok(Fork {
            owner: response.owner.login,
            repo: response.name,
            html_url: response.html_url,
        })
    }

    /// Open a pull request and return its web URL
    pub(super) async fn open_pull_request(
        &self,
        repo: &RepoSlug,
        pr: &NewPullRequest,
    ) -> Result<String> {
        let path = format!("repos/{}/{}/pulls", repo.owner, repo.repo);
        let body = CreatePullRequest {
            title: &pr.title,
            head: &pr.head,
            base: &pr.base,
            body: &pr.body,
        };
        let response: PullRequestResponse = self.post_json(&path, &body).await?;
        Ok(response.html_url)
    }
}
