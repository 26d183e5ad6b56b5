//! Candidate selection over a recursive tree listing.

use tracing::warn;

use crate::domain::{EntryType, TreeEntry};

/// Keep blobs whose path ends in `suffix` and whose declared size (if any)
/// does not exceed `max_bytes`. Order is preserved.
///
/// Oversized files are skipped with a warning; other entry types are
/// dropped silently.
pub fn select_candidates(entries: &[TreeEntry], suffix: &str, max_bytes: u64) -> Vec<TreeEntry> {
    entries
        .iter()
        .filter(|entry| entry.entry_type == EntryType::Blob && entry.path.ends_with(suffix))
        .filter(|entry| match entry.size {
            Some(size) if size > max_bytes => {
                warn!(
                    "Skipping {} because it is too big ({} bytes > {})",
                    entry.path, size, max_bytes
                );
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}
