//! Concurrent fetch-and-check of candidate files.
//!
//! One task per candidate, gated by a semaphore so at most `concurrency`
//! candidates are in flight. Every task sends exactly one `PatchOutcome` to
//! a single collector task, which owns the changeset while it is being
//! built. The join over all tasks is the barrier: once
//! `patch_candidates` returns, no writer remains.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::RepoHost;
use crate::domain::{Changeset, PatchedTreeEntry, RepoSlug, TreeEntry};
use crate::format::{FormatError, Formatter};

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Content differs from its canonical form
    Changed(PatchedTreeEntry),
    /// Already canonical
    Unchanged,
    /// Fetch or check failed; the candidate was dropped
    Failed,
}

/// Aggregate result of the pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub changeset: Changeset,
    pub unchanged: usize,
    pub failed: usize,
}

/// Check every candidate and collect the ones that need rewriting.
///
/// Per-candidate failures are logged and counted, never returned.
pub async fn patch_candidates(
    host: Arc<dyn RepoHost>,
    formatter: Arc<dyn Formatter>,
    repo: &RepoSlug,
    candidates: Vec<TreeEntry>,
    concurrency: NonZeroUsize,
) -> PatchReport {
    let total = candidates.len();
    let (tx, rx) = mpsc::unbounded_channel();
    let collector = tokio::spawn(collect(rx));

    let semaphore = Arc::new(Semaphore::new(concurrency.get()));
    let mut workers = JoinSet::new();
    let mut panicked = 0;

    debug!(
        "Checking {} candidates, at most {} at a time",
        total,
        concurrency.get()
    );

    for entry in candidates {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!("Worker pool closed early: {}", e);
                break;
            }
        };
        let host = Arc::clone(&host);
        let formatter = Arc::clone(&formatter);
        let repo = repo.clone();
        let tx = tx.clone();

        workers.spawn(async move {
            let outcome = patch_one(host.as_ref(), formatter.as_ref(), &repo, &entry).await;
            drop(permit);
            // The collector only stops once every sender is gone.
            let _ = tx.send(outcome);
        });
    }
    drop(tx);

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            warn!("Patch worker did not finish: {}", e);
            panicked += 1;
        }
    }

    let mut report = match collector.await {
        Ok(report) => report,
        Err(e) => {
            warn!("Patch collector did not finish: {}", e);
            PatchReport {
                failed: total,
                ..PatchReport::default()
            }
        }
    };
    report.failed += panicked;
    report
}

async fn collect(mut rx: mpsc::UnboundedReceiver<PatchOutcome>) -> PatchReport {
    let mut changed = Vec::new();
    let mut unchanged = 0;
    let mut failed = 0;

    while let Some(outcome) = rx.recv().await {
        match outcome {
            PatchOutcome::Changed(entry) => changed.push(entry),
            PatchOutcome::Unchanged => unchanged += 1,
            PatchOutcome::Failed => failed += 1,
        }
    }

    PatchReport {
        changeset: Changeset::new(changed),
        unchanged,
        failed,
    }
}

/// Fetch one candidate, check it, and build its patched entry if it changed.
async fn patch_one(
    host: &dyn RepoHost,
    formatter: &dyn Formatter,
    repo: &RepoSlug,
    entry: &TreeEntry,
) -> PatchOutcome {
    let label = entry.label();

    let raw = match host.get_raw_blob(repo, &entry.sha).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Fetching blob ({}): {:#}", label, e);
            return PatchOutcome::Failed;
        }
    };

    let checked = match formatter.check(&raw).await {
        Ok(checked) => checked,
        Err(FormatError::Syntax(message)) => {
            warn!("Bad source ({}): {}", label, message);
            info!("Content of {}:\n{}", label, String::from_utf8_lossy(&raw));
            return PatchOutcome::Failed;
        }
        Err(e) => {
            warn!("Checking ({}): {}", label, e);
            return PatchOutcome::Failed;
        }
    };

    if checked.is_canonical(&raw) {
        return PatchOutcome::Unchanged;
    }

    match String::from_utf8(checked.canonical) {
        Ok(content) => {
            info!("({}) needs formatting", label);
            PatchOutcome::Changed(PatchedTreeEntry::from_entry(entry, content))
        }
        Err(e) => {
            warn!("Formatted output of {} is not UTF-8: {}", label, e);
            PatchOutcome::Failed
        }
    }
}
