//! Test-only collaborators: an in-memory repository host and a
//! deterministic formatter.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::api::{NewCommit, NewPullRequest, RepoHost};
use crate::domain::{
    EntryType, Fork, PatchedTreeEntry, RepoSlug, ResolvedRef, TreeEntry, TreeListing,
};
use crate::format::{CheckOutcome, FormatError, Formatter};

pub const BASE_COMMIT: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678";
pub const BASE_TREE: &str = "7ree000000000000000000000000000000000000";
pub const NEW_TREE: &str = "7ree111111111111111111111111111111111111";
pub const NEW_COMMIT: &str = "c0ffee0000000000000000000000000000000000";
pub const FORK_OWNER: &str = "prbot-user";

/// Content that makes `TrimFormatter` report a syntax error.
pub const SYNTAX_ERROR_MARKER: &str = "SYNTAX ERROR";

/// One recorded call into `FakeHost`, with the identifiers it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ResolveRef {
        repo: RepoSlug,
        branch: String,
    },
    GetTree {
        repo: RepoSlug,
        commit_id: String,
    },
    GetRawBlob {
        repo: RepoSlug,
        sha: String,
    },
    CreateFork {
        repo: RepoSlug,
    },
    CreateTree {
        repo: RepoSlug,
        base_tree_id: String,
        entries: Vec<PatchedTreeEntry>,
    },
    CreateCommit {
        repo: RepoSlug,
        commit: NewCommit,
    },
    CreateBranch {
        repo: RepoSlug,
        branch: String,
        commit_id: String,
    },
    CreatePullRequest {
        repo: RepoSlug,
        pr: NewPullRequest,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Call::ResolveRef { .. } | Call::GetTree { .. } | Call::GetRawBlob { .. }
        )
    }
}

/// In-memory `RepoHost` holding one branch at one commit.
pub struct FakeHost {
    upstream: RepoSlug,
    object_type: String,
    entries: Vec<TreeEntry>,
    blobs: HashMap<String, Vec<u8>>,
    failing_blobs: HashSet<String>,
    fail_on: Option<&'static str>,
    fetch_delay: Duration,
    truncated: bool,
    calls: Mutex<Vec<Call>>,
    trees: Mutex<HashMap<String, Vec<TreeEntry>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeHost {
    pub fn new(owner: &str, repo: &str) -> Self {
        Self {
            upstream: RepoSlug {
                owner: owner.to_string(),
                repo: repo.to_string(),
            },
            object_type: "commit".to_string(),
            entries: Vec::new(),
            blobs: HashMap::new(),
            failing_blobs: HashSet::new(),
            fail_on: None,
            fetch_delay: Duration::ZERO,
            truncated: false,
            calls: Mutex::new(Vec::new()),
            trees: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn slug(&self) -> RepoSlug {
        self.upstream.clone()
    }

    /// Add a regular file blob.
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let sha = format!("{:040x}", self.entries.len() + 1);
        self.blobs.insert(sha.clone(), content.as_bytes().to_vec());
        self.entries.push(TreeEntry {
            path: path.to_string(),
            mode: "100644".to_string(),
            entry_type: EntryType::Blob,
            sha,
            size: Some(content.len() as u64),
        });
        self
    }

    /// Add an arbitrary entry (directories, submodules, executables).
    pub fn with_entry(mut self, entry: TreeEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Make blob fetches for `path` fail.
    pub fn fail_blob(mut self, path: &str) -> Self {
        if let Some(entry) = self.entries.iter().find(|e| e.path == path) {
            self.failing_blobs.insert(entry.sha.clone());
        }
        self
    }

    /// Make the named operation fail, e.g. `"create_commit"`.
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn with_object_type(mut self, object_type: &str) -> Self {
        self.object_type = object_type.to_string();
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Report the tree listing as cut short by the host.
    pub fn with_truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn blob_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::GetRawBlob { sha, .. } => Some(sha),
                _ => None,
            })
            .collect()
    }

    /// Entries of a tree created through `create_tree`.
    pub fn created_tree(&self, tree_id: &str) -> Option<Vec<TreeEntry>> {
        self.trees.lock().unwrap().get(tree_id).cloned()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, operation: &str) -> Result<()> {
        if self.fail_on == Some(operation) {
            anyhow::bail!("injected failure in {}", operation);
        }
        Ok(())
    }
}

#[async_trait]
impl RepoHost for FakeHost {
    async fn resolve_ref(&self, repo: &RepoSlug, branch: &str) -> Result<ResolvedRef> {
        self.record(Call::ResolveRef {
            repo: repo.clone(),
            branch: branch.to_string(),
        });
        self.check_failure("resolve_ref")?;
        Ok(ResolvedRef {
            object_type: self.object_type.clone(),
            commit_id: BASE_COMMIT.to_string(),
        })
    }

    async fn get_tree(&self, repo: &RepoSlug, commit_id: &str) -> Result<TreeListing> {
        self.record(Call::GetTree {
            repo: repo.clone(),
            commit_id: commit_id.to_string(),
        });
        self.check_failure("get_tree")?;
        Ok(TreeListing {
            tree_id: BASE_TREE.to_string(),
            entries: self.entries.clone(),
            truncated: self.truncated,
        })
    }

    async fn get_raw_blob(&self, repo: &RepoSlug, sha: &str) -> Result<Vec<u8>> {
        self.record(Call::GetRawBlob {
            repo: repo.clone(),
            sha: sha.to_string(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_blobs.contains(sha) {
            anyhow::bail!("injected blob failure for {}", sha);
        }
        self.blobs
            .get(sha)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such blob {}", sha))
    }

    async fn create_fork(&self, repo: &RepoSlug) -> Result<Fork> {
        self.record(Call::CreateFork { repo: repo.clone() });
        self.check_failure("create_fork")?;
        Ok(Fork {
            owner: FORK_OWNER.to_string(),
            repo: repo.repo.clone(),
            html_url: format!("https://github.com/{}/{}", FORK_OWNER, repo.repo),
        })
    }

    async fn create_tree(
        &self,
        repo: &RepoSlug,
        base_tree_id: &str,
        entries: &[PatchedTreeEntry],
    ) -> Result<String> {
        self.record(Call::CreateTree {
            repo: repo.clone(),
            base_tree_id: base_tree_id.to_string(),
            entries: entries.to_vec(),
        });
        self.check_failure("create_tree")?;
        if base_tree_id != BASE_TREE {
            anyhow::bail!("unknown base tree {}", base_tree_id);
        }

        let mut tree = self.entries.clone();
        for (i, patch) in entries.iter().enumerate() {
            let sha = format!("new{:037x}", i);
            match tree.iter_mut().find(|e| e.path == patch.path) {
                Some(existing) => {
                    existing.sha = sha;
                    existing.mode = patch.mode.clone();
                    existing.size = Some(patch.content.len() as u64);
                }
                None => tree.push(TreeEntry {
                    path: patch.path.clone(),
                    mode: patch.mode.clone(),
                    entry_type: EntryType::Blob,
                    sha,
                    size: Some(patch.content.len() as u64),
                }),
            }
        }
        self.trees.lock().unwrap().insert(NEW_TREE.to_string(), tree);
        Ok(NEW_TREE.to_string())
    }

    async fn create_commit(&self, repo: &RepoSlug, commit: &NewCommit) -> Result<String> {
        self.record(Call::CreateCommit {
            repo: repo.clone(),
            commit: commit.clone(),
        });
        self.check_failure("create_commit")?;
        Ok(NEW_COMMIT.to_string())
    }

    async fn create_branch(
        &self,
        repo: &RepoSlug,
        branch: &str,
        commit_id: &str,
    ) -> Result<String> {
        self.record(Call::CreateBranch {
            repo: repo.clone(),
            branch: branch.to_string(),
            commit_id: commit_id.to_string(),
        });
        self.check_failure("create_branch")?;
        Ok(format!("refs/heads/{}", branch))
    }

    async fn create_pull_request(&self, repo: &RepoSlug, pr: &NewPullRequest) -> Result<String> {
        self.record(Call::CreatePullRequest {
            repo: repo.clone(),
            pr: pr.clone(),
        });
        self.check_failure("create_pull_request")?;
        Ok(format!("https://github.com/{}/{}/pull/1", repo.owner, repo.repo))
    }
}

/// Canonical form = every line with trailing whitespace removed.
pub struct TrimFormatter;

pub fn trim_lines(source: &str) -> String {
    source
        .lines()
        .map(|line| format!("{}\n", line.trim_end()))
        .collect()
}

#[async_trait]
impl Formatter for TrimFormatter {
    async fn check(&self, raw: &[u8]) -> Result<CheckOutcome, FormatError> {
        let source = std::str::from_utf8(raw)
            .map_err(|e| FormatError::Syntax(format!("invalid UTF-8: {}", e)))?;
        if source.contains(SYNTAX_ERROR_MARKER) {
            return Err(FormatError::Syntax("expected item, found marker".to_string()));
        }
        Ok(CheckOutcome {
            canonical: trim_lines(source).into_bytes(),
        })
    }
}

/// In-memory log sink for a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    /// Subscriber writing plain text at `info` and above into this sink.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
