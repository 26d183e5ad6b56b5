//! Changeset to pull request.
//!
//! Each stage record owns the identifiers produced so far, and each
//! transition consumes its stage by value, so a step can only run with the
//! output of the step before it. There is no rollback: objects created by
//! earlier steps (a fork, say) stay in place when a later step fails.

use tracing::info;

use super::error::{Step, WorkflowError};
use crate::api::{NewCommit, NewPullRequest, RepoHost};
use crate::config::WorkflowConfig;
use crate::domain::{Changeset, Fork, RepoSlug};

/// Upstream state the changeset was computed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub repo: RepoSlug,
    pub base_branch: String,
    pub commit_id: String,
    pub tree_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forked {
    pub origin: Origin,
    pub fork: Fork,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeBuilt {
    pub origin: Origin,
    pub fork: Fork,
    pub tree_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub origin: Origin,
    pub fork: Fork,
    pub commit_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branched {
    pub origin: Origin,
    pub fork: Fork,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestOpened {
    pub fork: Fork,
    pub branch: String,
    pub url: String,
}

impl Origin {
    pub async fn fork(self, host: &dyn RepoHost) -> Result<Forked, WorkflowError> {
        info!("Creating fork ...");
        let fork = host
            .create_fork(&self.repo)
            .await
            .map_err(|e| WorkflowError::step(Step::CreateFork, e))?;
        info!("Fork URL: {}", fork.html_url);
        Ok(Forked { origin: self, fork })
    }
}

impl Forked {
    /// Create a tree in the fork: the upstream tree with only the changeset's
    /// paths overridden.
    pub async fn build_tree(
        self,
        host: &dyn RepoHost,
        changeset: &Changeset,
    ) -> Result<TreeBuilt, WorkflowError> {
        info!("Creating new tree ...");
        let tree_id = host
            .create_tree(&self.fork.slug(), &self.origin.tree_id, changeset.entries())
            .await
            .map_err(|e| WorkflowError::step(Step::CreateTree, e))?;
        info!("New tree: {}", tree_id);
        Ok(TreeBuilt {
            origin: self.origin,
            fork: self.fork,
            tree_id,
        })
    }
}

impl TreeBuilt {
    /// Commit the new tree with the upstream commit as its only parent.
    pub async fn commit(
        self,
        host: &dyn RepoHost,
        config: &WorkflowConfig,
    ) -> Result<Committed, WorkflowError> {
        info!("Creating commit ...");
        let commit = NewCommit {
            message: config.commit_message.clone(),
            tree_id: self.tree_id,
            parent_ids: vec![self.origin.commit_id.clone()],
        };
        let commit_id = host
            .create_commit(&self.fork.slug(), &commit)
            .await
            .map_err(|e| WorkflowError::step(Step::CreateCommit, e))?;
        info!("Commit: {}", commit_id);
        Ok(Committed {
            origin: self.origin,
            fork: self.fork,
            commit_id,
        })
    }
}

impl Committed {
    pub async fn branch(
        self,
        host: &dyn RepoHost,
        config: &WorkflowConfig,
    ) -> Result<Branched, WorkflowError> {
        info!("Creating branch ...");
        let branch = config.branch_name(&self.commit_id);
        host.create_branch(&self.fork.slug(), &branch, &self.commit_id)
            .await
            .map_err(|e| WorkflowError::step(Step::CreateBranch, e))?;
        info!("Branch URL: {}/tree/{}", self.fork.html_url, branch);
        Ok(Branched {
            origin: self.origin,
            fork: self.fork,
            branch,
        })
    }
}

impl Branched {
    /// Open the pull request on the upstream repository.
    pub async fn open_pull_request(
        self,
        host: &dyn RepoHost,
        config: &WorkflowConfig,
    ) -> Result<PullRequestOpened, WorkflowError> {
        info!("Creating pull request ...");
        let pr = NewPullRequest {
            title: config.pr_title.clone(),
            head: format!("{}:{}", self.fork.owner, self.branch),
            base: self.origin.base_branch.clone(),
            body: config.pr_body.clone(),
        };
        let url = host
            .create_pull_request(&self.origin.repo, &pr)
            .await
            .map_err(|e| WorkflowError::step(Step::CreatePullRequest, e))?;
        info!("Pull request: {}", url);
        Ok(PullRequestOpened {
            fork: self.fork,
            branch: self.branch,
            url,
        })
    }
}

/// Run all five steps for a non-empty changeset.
pub async fn assemble(
    host: &dyn RepoHost,
    origin: Origin,
    changeset: &Changeset,
    config: &WorkflowConfig,
) -> Result<PullRequestOpened, WorkflowError> {
    origin
        .fork(host)
        .await?
        .build_tree(host, changeset)
        .await?
        .commit(host, config)
        .await?
        .branch(host, config)
        .await?
        .open_pull_request(host, config)
        .await
}
