//! Workflow configuration.
//!
//! Defaults are the fixed values of the tool; a few can be overridden from
//! the environment.

use std::num::NonZeroUsize;

/// Environment variable bounding the number of files checked at once
pub const CONCURRENCY_ENV: &str = "PRBOT_CONCURRENCY";

/// Files larger than this are skipped (1 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 1 << 20;

pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    NotPositive { name: &'static str, value: String },
}

/// Everything the workflow needs besides the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Upstream branch to scan and to target with the pull request
    pub base_branch: String,
    /// Only paths ending in this suffix are candidates
    pub suffix: String,
    /// Candidates with a declared size above this are skipped
    pub max_bytes: u64,
    /// Maximum number of candidates checked at once
    pub concurrency: NonZeroUsize,
    /// Prefix of the branch created in the fork
    pub branch_prefix: String,
    pub commit_message: String,
    pub pr_title: String,
    pub pr_body: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            base_branch: "master".to_string(),
            suffix: ".rs".to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            branch_prefix: "prbot-rustfmt".to_string(),
            commit_message: "Run rustfmt over Rust source files.".to_string(),
            pr_title: "rustfmt everything".to_string(),
            pr_body: "I ran rustfmt over this repository using prbot, an automated tool."
                .to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(CONCURRENCY_ENV) {
            config.concurrency = value
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::NotPositive {
                    name: CONCURRENCY_ENV,
                    value,
                })?;
        }

        Ok(config)
    }

    /// Branch name for a commit: `<prefix>-<sha7>`.
    pub fn branch_name(&self, commit_id: &str) -> String {
        let short = commit_id.get(..7).unwrap_or(commit_id);
        format!("{}-{}", self.branch_prefix, short)
    }
}
