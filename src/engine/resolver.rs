//! Commit-to-PR identity resolution.
//!
//! Status events carry only a commit SHA. The commit index maps SHAs the bot
//! has already seen back to their PR; on a miss we fall back to listing the
//! repository's open PRs and scanning for a matching head commit. The
//! fallback runs without holding any per-PR lock, so a slow provider call
//! never blocks ingestion of unrelated events.

use thiserror::Error;
use tracing::debug;

use crate::github::ProviderError;
use crate::types::{PrId, RepoId, Sha};

use super::Engine;

/// Failure to attribute a commit to an open PR.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No open PR advertises this commit as its head. The event is dropped;
    /// a later event will re-trigger resolution if the commit becomes
    /// attributable.
    #[error("no open PR in {repo} has head commit {sha}")]
    NoMatchingPr { repo: RepoId, sha: Sha },

    /// The open-PR listing itself failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl Engine {
    /// Resolves the PR that owns `sha` as its head commit.
    pub(crate) async fn resolve_pr_for_commit(
        &self,
        repo: &RepoId,
        sha: &Sha,
    ) -> Result<PrId, ResolveError> {
        if let Some(pr_id) = self.store().resolve_commit(sha).await {
            return Ok(pr_id);
        }

        debug!(repo = %repo, sha = %sha.short(), "commit index miss, listing open PRs");

        let heads = self
            .bounded(self.provider_ref().list_open_pull_requests(repo))
            .await?;

        heads
            .iter()
            .find(|head| &head.head_sha == sha)
            .map(|head| PrId::new(repo.clone(), head.number))
            .ok_or_else(|| ResolveError::NoMatchingPr {
                repo: repo.clone(),
                sha: sha.clone(),
            })
    }
}
