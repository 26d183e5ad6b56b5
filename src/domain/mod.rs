//! Domain types shared across modules.
//!
//! These structures are used by the API client (to decode trees and encode
//! tree overrides), the patch pipeline (to select and rewrite files) and the
//! pull request assembler. Keeping them here avoids circular dependencies
//! between those modules.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Blob,
    Tree,
    /// Submodule gitlink.
    Commit,
    #[serde(other)]
    Other,
}

/// One entry of a recursive tree listing, as returned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    /// Short label used in diagnostics: `<path> <sha7>`.
    pub fn label(&self) -> String {
        let short = self.sha.get(..7).unwrap_or(&self.sha);
        format!("{} {}", self.path, short)
    }
}

/// A tree entry whose content was replaced by its canonical form.
///
/// The content hash is deliberately absent; the host computes it when the
/// tree is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedTreeEntry {
    pub path: String,
    pub mode: String,
    pub content: String,
}

impl PatchedTreeEntry {
    pub fn from_entry(entry: &TreeEntry, content: String) -> Self {
        Self {
            path: entry.path.clone(),
            mode: entry.mode.clone(),
            content,
        }
    }
}

/// Files whose canonical form differs from their current remote content.
///
/// Frozen once the patch pipeline returns it; consumed by tree creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    entries: Vec<PatchedTreeEntry>,
}

impl Changeset {
    pub fn new(mut entries: Vec<PatchedTreeEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[PatchedTreeEntry] {
        &self.entries
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }
}

/// A branch tip resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub object_type: String,
    pub commit_id: String,
}

/// A full recursive tree listing at one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeListing {
    pub tree_id: String,
    pub entries: Vec<TreeEntry>,
    pub truncated: bool,
}

/// A fork created under the acting identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fork {
    pub owner: String,
    pub repo: String,
    pub html_url: String,
}

impl Fork {
    pub fn slug(&self) -> RepoSlug {
        RepoSlug {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
        }
    }
}

/// `owner/repo` pair naming a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("expected OWNER/REPO with exactly one '/', got {0:?}")]
    Shape(String),
    #[error("invalid characters in {0:?}")]
    Name(String),
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static regex"))
}

impl FromStr for RepoSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let (owner, repo) = match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                (owner, repo)
            }
            _ => return Err(SlugError::Shape(s.to_string())),
        };

        for name in [owner, repo] {
            if !name_pattern().is_match(name) {
                return Err(SlugError::Name(name.to_string()));
            }
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
