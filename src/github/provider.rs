//! The provider gateway trait and its data types.
//!
//! Each method maps to one REST operation the bot needs. Implementations must
//! not retry internally: the bot's retry is the next qualifying event, and
//! callers bound each call with a timeout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{PrId, PrNumber, RepoId, Sha};

use super::error::ProviderError;

/// Provider-reported facts about a single PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrSnapshot {
    /// Current head commit of the PR branch.
    pub head_sha: Sha,

    /// Source branch name.
    pub branch_ref: String,

    /// Whether the provider considers the PR cleanly mergeable.
    ///
    /// The provider computes this asynchronously; `false` also covers
    /// "not yet computed", which is why callers refresh on a delay.
    pub mergeable: bool,

    /// Whether the PR is still open.
    pub open: bool,
}

/// One review from the provider's chronologically ordered review list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    /// The reviewer's login.
    pub reviewer: String,

    /// Whether this review is an approval.
    pub approved: bool,

    /// When the review was submitted, if the provider reports it.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Head-commit info for one open PR, from the open-PR listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPrHead {
    pub number: PrNumber,
    pub head_sha: Sha,
}

/// The REST operations the bot consumes from the code-hosting provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fetches current PR facts (head commit, branch, mergeability).
    async fn get_pull_request(&self, pr: &PrId) -> Result<PrSnapshot, ProviderError>;

    /// Lists a PR's reviews in chronological order.
    async fn list_reviews(&self, pr: &PrId) -> Result<Vec<ReviewRecord>, ProviderError>;

    /// Lists the head commits of all open PRs in a repository.
    async fn list_open_pull_requests(&self, repo: &RepoId)
    -> Result<Vec<OpenPrHead>, ProviderError>;

    /// Merges a PR, guarded by the expected head commit: if the PR's head has
    /// moved since readiness was evaluated, the provider rejects the merge
    /// instead of integrating unreviewed code.
    async fn merge_pull_request(&self, pr: &PrId, expected_head: &Sha)
    -> Result<(), ProviderError>;

    /// Deletes a branch ref after a successful merge.
    async fn delete_branch_ref(&self, repo: &RepoId, branch_ref: &str)
    -> Result<(), ProviderError>;
}

/// Folds an ordered review list into a reviewer -> approved map.
///
/// The list is chronological, so a reviewer appearing multiple times ends up
/// with their last-listed verdict: most recent review wins, as an explicit
/// policy rather than an accident of map insertion.
pub fn fold_reviews(reviews: &[ReviewRecord]) -> std::collections::HashMap<String, bool> {
    let mut map = std::collections::HashMap::new();
    for review in reviews {
        map.insert(review.reviewer.clone(), review.approved);
    }
    map
}
