//! Request and response bodies for the GitHub REST endpoints we call.
//!
//! Only the fields the workflow reads are modelled; everything else in the
//! responses is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::domain::TreeEntry;

/// `GET git/ref/heads/{branch}` response
#[derive(Debug, Deserialize)]
pub(super) struct RefResponse {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
pub(super) struct GitObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub sha: String,
}

/// `GET git/trees/{sha}?recursive=1` response
#[derive(Debug, Deserialize)]
pub(super) struct TreeResponse {
    pub sha: String,
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// `POST forks` response
#[derive(Debug, Deserialize)]
pub(super) struct ForkResponse {
    pub name: String,
    pub owner: Owner,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Owner {
    pub login: String,
}

/// Tree override entry for `POST git/trees`
#[derive(Debug, Serialize)]
pub(super) struct NewTreeEntry<'a> {
    pub path: &'a str,
    pub mode: &'a str,
    #[serde(rename = "type")]
    pub entry_type: &'static str,
    pub content: &'a str,
}

/// `POST git/trees` request body
#[derive(Debug, Serialize)]
pub(super) struct CreateTreeRequest<'a> {
    pub base_tree: &'a str,
    pub tree: Vec<NewTreeEntry<'a>>,
}

/// Response of `POST git/trees` and `POST git/commits`
#[derive(Debug, Deserialize)]
pub(super) struct ShaResponse {
    pub sha: String,
}

/// `POST git/commits` request body
#[derive(Debug, Serialize)]
pub(super) struct CreateCommitRequest<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: Vec<&'a str>,
}

/// `POST git/refs` request body
#[derive(Debug, Serialize)]
pub(super) struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: &'a str,
}

/// `POST git/refs` response
#[derive(Debug, Deserialize)]
pub(super) struct CreateRefResponse {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// `POST pulls` request body
#[derive(Debug, Serialize)]
pub(super) struct CreatePullRequest<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: &'a str,
    pub body: &'a str,
}

/// `POST pulls` response
#[derive(Debug, Deserialize)]
pub(super) struct PullRequestResponse {
    pub html_url: String,
}
