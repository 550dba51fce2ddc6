//! Shared test utilities: a scriptable in-memory provider and event builders.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::engine::{Engine, EngineSettings};
use crate::github::{OpenPrHead, PrSnapshot, Provider, ProviderError, ReviewRecord};
use crate::types::{PrId, PrNumber, RepoId, Sha};
use crate::webhooks::events::{
    CheckState, CheckStatusEvent, Event, PrAction, PrUpdatedEvent, ReviewState,
    ReviewSubmittedEvent,
};

/// A scriptable provider: responses are seeded per PR, side effects are
/// recorded for assertions.
#[derive(Default)]
pub struct MockProvider {
    pub snapshots: Mutex<HashMap<PrId, PrSnapshot>>,
    pub reviews: Mutex<HashMap<PrId, Vec<ReviewRecord>>>,
    pub open_prs: Mutex<HashMap<RepoId, Vec<OpenPrHead>>>,

    /// Errors to return from `merge_pull_request`, consumed front-first
    /// before merges start succeeding.
    pub merge_failures: Mutex<VecDeque<ProviderError>>,

    /// Successfully merged (PR, expected head) pairs, in order.
    pub merged: Mutex<Vec<(PrId, Sha)>>,

    /// Successfully deleted (repo, branch) pairs, in order.
    pub deleted_branches: Mutex<Vec<(RepoId, String)>>,

    /// When set, `delete_branch_ref` fails.
    pub fail_branch_delete: AtomicBool,

    /// When set, `get_pull_request` hangs until the caller's timeout fires.
    pub hang_get_pull_request: AtomicBool,

    /// Number of `list_open_pull_requests` calls observed.
    pub open_pr_list_calls: AtomicUsize,
}

impl MockProvider {
    pub async fn set_snapshot(&self, pr: PrId, snapshot: PrSnapshot) {
        self.snapshots.lock().await.insert(pr, snapshot);
    }

    pub async fn set_reviews(&self, pr: PrId, reviews: Vec<ReviewRecord>) {
        self.reviews.lock().await.insert(pr, reviews);
    }

    pub async fn set_open_prs(&self, repo: RepoId, heads: Vec<OpenPrHead>) {
        self.open_prs.lock().await.insert(repo, heads);
    }

    pub async fn queue_merge_failure(&self, error: ProviderError) {
        self.merge_failures.lock().await.push_back(error);
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn get_pull_request(&self, pr: &PrId) -> Result<PrSnapshot, ProviderError> {
        if self.hang_get_pull_request.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.snapshots
            .lock()
            .await
            .get(pr)
            .cloned()
            .ok_or_else(|| ProviderError::permanent(format!("no snapshot seeded for {pr}")))
    }

    async fn list_reviews(&self, pr: &PrId) -> Result<Vec<ReviewRecord>, ProviderError> {
        Ok(self.reviews.lock().await.get(pr).cloned().unwrap_or_default())
    }

    async fn list_open_pull_requests(
        &self,
        repo: &RepoId,
    ) -> Result<Vec<OpenPrHead>, ProviderError> {
        self.open_pr_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .open_prs
            .lock()
            .await
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn merge_pull_request(
        &self,
        pr: &PrId,
        expected_head: &Sha,
    ) -> Result<(), ProviderError> {
        if let Some(error) = self.merge_failures.lock().await.pop_front() {
            return Err(error);
        }
        self.merged
            .lock()
            .await
            .push((pr.clone(), expected_head.clone()));
        Ok(())
    }

    async fn delete_branch_ref(
        &self,
        repo: &RepoId,
        branch_ref: &str,
    ) -> Result<(), ProviderError> {
        if self.fail_branch_delete.load(Ordering::SeqCst) {
            return Err(ProviderError::transient("ref deletion unavailable"));
        }
        self.deleted_branches
            .lock()
            .await
            .push((repo.clone(), branch_ref.to_string()));
        Ok(())
    }
}

// ─── Builders ─────────────────────────────────────────────────────────────────

pub fn test_repo() -> RepoId {
    RepoId::new("octocat", "hello-world")
}

pub fn pr_id(n: u64) -> PrId {
    PrId::new(test_repo(), PrNumber(n))
}

pub fn sha(c: char) -> Sha {
    Sha::new(c.to_string().repeat(40))
}

pub fn snapshot(head: char, mergeable: bool, open: bool) -> PrSnapshot {
    PrSnapshot {
        head_sha: sha(head),
        branch_ref: "feature".to_string(),
        mergeable,
        open,
    }
}

pub fn review_record(reviewer: &str, approved: bool) -> ReviewRecord {
    ReviewRecord {
        reviewer: reviewer.to_string(),
        approved,
        submitted_at: None,
    }
}

pub fn pr_updated(number: u64, head: char, action: PrAction) -> Event {
    Event::PullRequest(PrUpdatedEvent {
        repo: test_repo(),
        action,
        pr_number: PrNumber(number),
        head_sha: sha(head),
        branch_ref: "feature".to_string(),
    })
}

pub fn review_submitted(number: u64, head: char, reviewer: &str, state: ReviewState) -> Event {
    Event::Review(ReviewSubmittedEvent {
        repo: test_repo(),
        pr_number: PrNumber(number),
        head_sha: sha(head),
        branch_ref: "feature".to_string(),
        reviewer: reviewer.to_string(),
        state,
    })
}

pub fn check_status(head: char, context: &str, state: &str) -> Event {
    Event::Status(CheckStatusEvent {
        repo: test_repo(),
        sha: sha(head),
        context: context.to_string(),
        state: CheckState::classify(state),
    })
}

/// Engine settings for tests: the scheduled refresh delay is far beyond any
/// test's runtime, so refreshes only happen when a test calls
/// `Engine::refresh` explicitly.
pub fn test_settings() -> EngineSettings {
    EngineSettings {
        mergeable_refresh_delay: Duration::from_secs(3600),
        provider_timeout: Duration::from_secs(30),
        delete_branch_after_merge: false,
    }
}

pub fn test_engine(provider: Arc<MockProvider>) -> Engine {
    Engine::new(provider, test_settings())
}

pub fn test_engine_with(provider: Arc<MockProvider>, settings: EngineSettings) -> Engine {
    Engine::new(provider, settings)
}
