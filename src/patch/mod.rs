//! Patch discovery.
//!
//! Narrows a tree listing to candidate files, then checks every candidate
//! concurrently and collects the files whose canonical form differs from
//! their remote content:
//! - `select`: suffix/size/type filtering of the recursive tree
//! - `pool`: bounded fan-out of fetch + check, fan-in over a channel

mod pool;
mod select;

pub use pool::patch_candidates;
pub use select::select_candidates;
