//! The merge orchestrator.
//!
//! Sequences the side-effecting actions once a PR's state evaluates ready:
//! claim the merge (test-and-set), merge guarded by the expected head commit,
//! optionally delete the source branch, then drop the PR's state. A failed
//! merge rolls the claim back so the next qualifying event can retry; a
//! failed branch deletion is logged and never retried.

use tracing::{debug, error, info, warn};

use crate::github::ProviderErrorKind;
use crate::types::{PrId, PullRequestState};

use super::{Engine, readiness};

/// What happened when a PR's state was put before the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The gating conditions are not all satisfied yet.
    NotReady,

    /// Another concurrent path already dispatched the merge for this
    /// generation. Not an error.
    LostRace,

    /// The PR was merged.
    Merged,

    /// The merge call failed; the claim was rolled back and the state kept
    /// so a later event can retry.
    Failed,
}

impl Engine {
    /// Evaluates `state` and, if ready, performs the merge exactly once.
    ///
    /// `state` must be a snapshot taken under the PR's exclusion scope; its
    /// `head_sha` doubles as the stale-merge guard passed to the provider.
    pub(crate) async fn try_merge(&self, pr_id: &PrId, state: &PullRequestState) -> MergeOutcome {
        if !readiness::ready(state) {
            debug!(pr = %pr_id, outcome = "not-ready", "readiness not satisfied");
            return MergeOutcome::NotReady;
        }

        if !self.store().mark_completed(pr_id).await {
            debug!(pr = %pr_id, "merge already dispatched for this generation");
            return MergeOutcome::LostRace;
        }

        info!(pr = %pr_id, head = %state.head_sha.short(), "all gates satisfied, merging");

        if let Err(e) = self
            .bounded(
                self.provider_ref()
                    .merge_pull_request(pr_id, &state.head_sha),
            )
            .await
        {
            // Roll back the claim: whatever the failure, the next qualifying
            // event re-evaluates against fresh state and may merge then.
            self.store().clear_completed(pr_id).await;
            match e.kind {
                ProviderErrorKind::MergeConflict => {
                    warn!(pr = %pr_id, outcome = "error", error = %e, "merge rejected, awaiting fresh state")
                }
                _ => error!(pr = %pr_id, outcome = "error", error = %e, "merge failed"),
            }
            return MergeOutcome::Failed;
        }

        info!(pr = %pr_id, outcome = "merged", "merged");

        if self.settings().delete_branch_after_merge {
            if let Err(e) = self
                .bounded(
                    self.provider_ref()
                        .delete_branch_ref(&pr_id.repo, &state.branch_ref),
                )
                .await
            {
                // The merge already happened; cleanup failure is non-fatal
                // and not retried. The state entry stays so the failure is
                // visible until the PR's closed event evicts it.
                warn!(
                    pr = %pr_id,
                    branch = %state.branch_ref,
                    error = %e,
                    "branch cleanup failed after merge"
                );
                return MergeOutcome::Merged;
            }
        }

        self.store().remove(pr_id).await;
        MergeOutcome::Merged
    }
}
