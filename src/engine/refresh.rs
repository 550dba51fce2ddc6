//! Out-of-band mergeable/review refresh.
//!
//! The provider computes mergeability asynchronously after a push, so asking
//! immediately reads a false "not mergeable yet". Each triggering event
//! schedules one refresh task that waits a short deliberate delay, then
//! fetches the PR and its review list with bounded timeouts — trading a
//! bounded staleness window for a trustworthy verdict.
//!
//! A failed or timed-out fetch leaves the cached values in place and
//! schedules nothing: the next incoming event is the retry.

use tracing::{debug, warn};

use crate::github::provider::fold_reviews;
use crate::types::PrId;

use super::Engine;

impl Engine {
    /// Schedules a delayed refresh of `pr_id`'s mergeability and reviews.
    pub(crate) fn schedule_refresh(&self, pr_id: PrId) {
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(engine.settings().mergeable_refresh_delay).await;
            engine.refresh(&pr_id).await;
        });
    }

    /// Fetches the provider's current view of the PR and folds it into the
    /// store, re-evaluating readiness after each applied field.
    pub(crate) async fn refresh(&self, pr_id: &PrId) {
        // The PR may have merged or closed while this task slept.
        if self.store().snapshot(pr_id).await.is_none() {
            return;
        }

        let fetched = match self.bounded(self.provider_ref().get_pull_request(pr_id)).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(pr = %pr_id, error = %e, "mergeable refresh failed, keeping cached verdict");
                return;
            }
        };

        if !fetched.open {
            debug!(pr = %pr_id, "PR no longer open, skipping refresh");
            return;
        }

        // Re-keying through ensure keeps reset-on-head-change the single
        // source of signal relevance: if the head moved while we slept, the
        // stale signals are gone before the fresh verdict lands.
        self.store()
            .ensure(pr_id, &fetched.head_sha, Some(&fetched.branch_ref))
            .await;

        let after_mergeable = self
            .store()
            .merge_field(pr_id, |state| state.mergeable = fetched.mergeable)
            .await;

        match self.bounded(self.provider_ref().list_reviews(pr_id)).await {
            Ok(reviews) => {
                // Wholesale replacement: the provider's chronologically
                // ordered list is authoritative, last verdict per reviewer
                // wins.
                let verdicts = fold_reviews(&reviews);
                if let Some(snapshot) = self
                    .store()
                    .merge_field(pr_id, |state| state.replace_reviews(verdicts))
                    .await
                {
                    self.try_merge(pr_id, &snapshot).await;
                }
            }
            Err(e) => {
                warn!(pr = %pr_id, error = %e, "review refresh failed, keeping cached reviews");
                if let Some(snapshot) = after_mergeable {
                    self.try_merge(pr_id, &snapshot).await;
                }
            }
        }
    }
}
