//! End-to-end workflow: resolve, scan, patch, and open a pull request.

mod assemble;
mod error;

pub use assemble::{assemble, Origin};
pub use error::{Step, WorkflowError};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::RepoHost;
use crate::config::WorkflowConfig;
use crate::domain::RepoSlug;
use crate::format::Formatter;
use crate::patch::{patch_candidates, select_candidates};

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to change; no remote writes were made.
    NoChanges { unchanged: usize, failed: usize },
    /// `head` is the `owner:branch` the pull request was opened from.
    PullRequest {
        url: String,
        head: String,
        files: usize,
    },
}

/// Run the whole workflow against `repo`.
///
/// Failures before the patch stage and in any pull request step abort the
/// run. Per-file failures only reduce coverage.
pub async fn run(
    host: Arc<dyn RepoHost>,
    formatter: Arc<dyn Formatter>,
    repo: &RepoSlug,
    config: &WorkflowConfig,
) -> Result<Outcome, WorkflowError> {
    let branch = &config.base_branch;

    info!("Resolving branch {} in {} ...", branch, repo);
    let resolved = host
        .resolve_ref(repo, branch)
        .await
        .map_err(|e| WorkflowError::step(Step::ResolveBranch, e))?;
    if resolved.object_type != "commit" {
        return Err(WorkflowError::NotACommit {
            branch: branch.clone(),
            object_type: resolved.object_type,
        });
    }
    let commit_id = resolved.commit_id;

    info!("Fetching tree for {} @ {} ...", repo, commit_id);
    let tree = host
        .get_tree(repo, &commit_id)
        .await
        .map_err(|e| WorkflowError::step(Step::FetchTree, e))?;
    info!(
        "Original tree with {} entries: {} ...",
        tree.entries.len(),
        tree.tree_id
    );
    if tree.truncated {
        warn!("Tree listing was truncated by the host; some files will not be checked");
    }

    let candidates = select_candidates(&tree.entries, &config.suffix, config.max_bytes);
    info!("Found {} candidate source files", candidates.len());

    let report = patch_candidates(
        Arc::clone(&host),
        formatter,
        repo,
        candidates,
        config.concurrency,
    )
    .await;
    info!(
        "Found {} source files that need changes",
        report.changeset.len()
    );
    debug!(
        "Changed files: {:?}",
        report.changeset.paths().collect::<Vec<_>>()
    );
    if report.failed > 0 {
        warn!(
            "{} candidate(s) could not be checked; see earlier warnings",
            report.failed
        );
    }

    if report.changeset.is_empty() {
        info!("No changes needed");
        return Ok(Outcome::NoChanges {
            unchanged: report.unchanged,
            failed: report.failed,
        });
    }

    let origin = Origin {
        repo: repo.clone(),
        base_branch: branch.clone(),
        commit_id,
        tree_id: tree.tree_id,
    };
    let opened = assemble(host.as_ref(), origin, &report.changeset, config).await?;

    Ok(Outcome::PullRequest {
        url: opened.url,
        head: format!("{}:{}", opened.fork.owner, opened.branch),
        files: report.changeset.len(),
    })
}
