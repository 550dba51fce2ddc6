//! Signal ingestors: one normalizer per event kind.
//!
//! Each ingestor follows the same pattern: establish the PR's store entry
//! (which resets stale signals if the head commit moved), merge the event's
//! signal under the PR's exclusion scope, schedule the out-of-band provider
//! refresh, and unconditionally re-evaluate readiness.

use tracing::{info, warn};

use crate::types::PrId;
use crate::webhooks::events::{CheckState, CheckStatusEvent, PrAction, PrUpdatedEvent, ReviewSubmittedEvent};

use super::Engine;

impl Engine {
    /// Ingests a submitted review.
    ///
    /// The event's verdict is recorded immediately; the scheduled refresh
    /// then replaces the whole review map from the provider, which is
    /// authoritative for historical reviews.
    pub(crate) async fn ingest_review(&self, event: ReviewSubmittedEvent) {
        let pr_id = PrId::new(event.repo, event.pr_number);

        self.store()
            .ensure(&pr_id, &event.head_sha, Some(&event.branch_ref))
            .await;

        let approved = event.state.is_approval();
        let snapshot = self
            .store()
            .merge_field(&pr_id, |state| state.set_review(&event.reviewer, approved))
            .await;

        self.schedule_refresh(pr_id.clone());

        if let Some(snapshot) = snapshot {
            self.try_merge(&pr_id, &snapshot).await;
        }
    }

    /// Ingests a PR lifecycle event.
    ///
    /// A closed PR (merged or abandoned) is evicted outright; everything else
    /// re-keys the entry to the delivered head commit and schedules a
    /// refresh.
    pub(crate) async fn ingest_pull_request(&self, event: PrUpdatedEvent) {
        let pr_id = PrId::new(event.repo, event.pr_number);

        if event.action == PrAction::Closed {
            info!(pr = %pr_id, "PR closed, evicting state");
            self.store().remove(&pr_id).await;
            return;
        }

        self.store()
            .ensure(&pr_id, &event.head_sha, Some(&event.branch_ref))
            .await;

        self.schedule_refresh(pr_id.clone());

        if let Some(snapshot) = self.store().snapshot(&pr_id).await {
            self.try_merge(&pr_id, &snapshot).await;
        }
    }

    /// Ingests a commit status.
    ///
    /// Status events carry no PR identity, so the commit must first be
    /// attributed via the index or a provider lookup; an unattributable
    /// commit drops the event (a later event re-triggers resolution).
    pub(crate) async fn ingest_status(&self, event: CheckStatusEvent) {
        if let CheckState::Unrecognized(raw) = &event.state {
            warn!(
                context = %event.context,
                state = %raw,
                "unrecognized check state, treating as not passing"
            );
        }
        let passed = event.state.is_pass();

        let pr_id = match self.resolve_pr_for_commit(&event.repo, &event.sha).await {
            Ok(pr_id) => pr_id,
            Err(e) => {
                warn!(
                    repo = %event.repo,
                    sha = %event.sha.short(),
                    error = %e,
                    "dropping status event"
                );
                return;
            }
        };

        self.store().ensure(&pr_id, &event.sha, None).await;

        let snapshot = self
            .store()
            .merge_field(&pr_id, |state| state.set_check(&event.context, passed))
            .await;

        self.schedule_refresh(pr_id.clone());

        if let Some(snapshot) = snapshot {
            self.try_merge(&pr_id, &snapshot).await;
        }
    }
}
