//! Shared PR state store and commit index.
//!
//! This is the only shared mutable state in the bot. It replaces ambient
//! global maps with an encapsulated store offering a small set of atomic
//! operations, so the exclusion discipline cannot be bypassed from event
//! handlers.
//!
//! # Locking discipline
//!
//! The outer `RwLock` guards only the two maps (entry lookup/insert/remove and
//! the commit index). Each PR entry carries its own `Mutex`; every field
//! mutation happens under that per-entry lock, so events for the same PR
//! serialize while unrelated PRs proceed fully in parallel. The outer lock is
//! never held across an `.await` on an entry lock or any provider call.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::types::{PrId, PullRequestState, Sha};

/// In-memory store of per-PR aggregated state, keyed by canonical PR id,
/// plus the advisory commit-SHA -> PR index used to attribute status events.
#[derive(Default)]
pub struct PrStateStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    prs: HashMap<PrId, Arc<Mutex<PullRequestState>>>,
    commits: HashMap<Sha, PrId>,
}

impl PrStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures an entry exists for `pr_id` and is current for `head_sha`.
    ///
    /// Creates the entry if absent. If present with a different stored head
    /// commit, resets `checks`/`reviews`/`mergeable`/`completed` — signals
    /// from a superseded commit never carry over. Always records
    /// `head_sha -> pr_id` in the commit index, and refreshes the stored
    /// branch ref when one is supplied.
    ///
    /// The reset and any concurrent `merge_field` for the same PR serialize
    /// on the entry lock, so a reset can never interleave with a field write.
    pub async fn ensure(&self, pr_id: &PrId, head_sha: &Sha, branch_ref: Option<&str>) {
        let entry = {
            let mut inner = self.inner.write().await;
            inner.commits.insert(head_sha.clone(), pr_id.clone());
            inner
                .prs
                .entry(pr_id.clone())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(PullRequestState::new(
                        head_sha.clone(),
                        branch_ref.unwrap_or_default(),
                    )))
                })
                .clone()
        };

        let mut state = entry.lock().await;
        state.observe_head(head_sha);
        if let Some(branch_ref) = branch_ref {
            state.branch_ref = branch_ref.to_string();
        }
    }

    /// Applies a field-level mutation under the PR's exclusion scope.
    ///
    /// Returns a snapshot of the state taken while the entry lock is still
    /// held, so the caller's readiness evaluation sees one consistent
    /// head-commit generation. Returns `None` if no entry exists for `pr_id`
    /// (e.g. it was removed after a merge).
    pub async fn merge_field<F>(&self, pr_id: &PrId, mutator: F) -> Option<PullRequestState>
    where
        F: FnOnce(&mut PullRequestState),
    {
        let entry = self.entry(pr_id).await?;
        let mut state = entry.lock().await;
        mutator(&mut state);
        Some(state.clone())
    }

    /// Atomically claims the merge action for the PR's current generation.
    ///
    /// Returns true if this call won (flag was unset and is now set), false
    /// if another path already dispatched a merge or the entry is gone. This
    /// is the sole guard against double-merging.
    pub async fn mark_completed(&self, pr_id: &PrId) -> bool {
        let Some(entry) = self.entry(pr_id).await else {
            return false;
        };
        let mut state = entry.lock().await;
        if state.completed {
            false
        } else {
            state.completed = true;
            true
        }
    }

    /// Releases a previously claimed merge intent after a failed merge, so
    /// the next qualifying event can try again.
    pub async fn clear_completed(&self, pr_id: &PrId) {
        if let Some(entry) = self.entry(pr_id).await {
            entry.lock().await.completed = false;
        }
    }

    /// Deletes the PR's entry and every commit-index entry pointing at it.
    pub async fn remove(&self, pr_id: &PrId) {
        let mut inner = self.inner.write().await;
        inner.prs.remove(pr_id);
        inner.commits.retain(|_, id| id != pr_id);
    }

    /// Looks up which PR most recently advertised `sha` as its head commit.
    ///
    /// Advisory only: a miss means the caller should ask the provider, never
    /// that the event can be dropped.
    pub async fn resolve_commit(&self, sha: &Sha) -> Option<PrId> {
        self.inner.read().await.commits.get(sha).cloned()
    }

    /// Returns a snapshot of a PR's current state, if present.
    pub async fn snapshot(&self, pr_id: &PrId) -> Option<PullRequestState> {
        let entry = self.entry(pr_id).await?;
        let state = entry.lock().await;
        Some(state.clone())
    }

    /// Number of tracked PRs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.prs.len()
    }

    /// True if no PRs are tracked.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn entry(&self, pr_id: &PrId) -> Option<Arc<Mutex<PullRequestState>>> {
        self.inner.read().await.prs.get(pr_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoId;

    fn pr_id(n: u64) -> PrId {
        PrId::new(RepoId::new("octocat", "hello-world"), n)
    }

    fn sha(c: char) -> Sha {
        Sha::new(c.to_string().repeat(40))
    }

    #[tokio::test]
    async fn ensure_creates_entry_and_indexes_commit() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), Some("feature")).await;

        let state = store.snapshot(&pr_id(1)).await.unwrap();
        assert_eq!(state.head_sha, sha('a'));
        assert_eq!(state.branch_ref, "feature");
        assert_eq!(store.resolve_commit(&sha('a')).await, Some(pr_id(1)));
    }

    #[tokio::test]
    async fn ensure_with_new_head_resets_signals() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), Some("feature")).await;
        store
            .merge_field(&pr_id(1), |s| {
                s.set_check("ci", true);
                s.set_review("alice", true);
                s.mergeable = true;
            })
            .await
            .unwrap();

        store.ensure(&pr_id(1), &sha('b'), Some("feature")).await;

        let state = store.snapshot(&pr_id(1)).await.unwrap();
        assert_eq!(state.head_sha, sha('b'));
        assert!(state.checks.is_empty());
        assert!(state.reviews.is_empty());
        assert!(!state.mergeable);
        // Both generations remain in the index; each maps to this PR.
        assert_eq!(store.resolve_commit(&sha('b')).await, Some(pr_id(1)));
    }

    #[tokio::test]
    async fn ensure_without_branch_ref_keeps_stored_one() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), Some("feature")).await;
        store.ensure(&pr_id(1), &sha('a'), None).await;

        let state = store.snapshot(&pr_id(1)).await.unwrap();
        assert_eq!(state.branch_ref, "feature");
    }

    #[tokio::test]
    async fn merge_field_on_missing_entry_returns_none() {
        let store = PrStateStore::new();
        let result = store.merge_field(&pr_id(1), |s| s.mergeable = true).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn merge_field_returns_post_mutation_snapshot() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), None).await;

        let snap = store
            .merge_field(&pr_id(1), |s| s.set_check("ci", true))
            .await
            .unwrap();
        assert_eq!(snap.checks.get("ci"), Some(&true));
    }

    #[tokio::test]
    async fn mark_completed_wins_exactly_once() {
        let store = Arc::new(PrStateStore::new());
        store.ensure(&pr_id(1), &sha('a'), None).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.mark_completed(&pr_id(1)).await },
            ));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn mark_completed_on_missing_entry_is_false() {
        let store = PrStateStore::new();
        assert!(!store.mark_completed(&pr_id(9)).await);
    }

    #[tokio::test]
    async fn clear_completed_allows_reclaiming() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), None).await;

        assert!(store.mark_completed(&pr_id(1)).await);
        assert!(!store.mark_completed(&pr_id(1)).await);

        store.clear_completed(&pr_id(1)).await;
        assert!(store.mark_completed(&pr_id(1)).await);
    }

    #[tokio::test]
    async fn remove_drops_entry_and_index_entries() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), None).await;
        store.ensure(&pr_id(1), &sha('b'), None).await;
        store.ensure(&pr_id(2), &sha('c'), None).await;

        store.remove(&pr_id(1)).await;

        assert!(store.snapshot(&pr_id(1)).await.is_none());
        assert_eq!(store.resolve_commit(&sha('a')).await, None);
        assert_eq!(store.resolve_commit(&sha('b')).await, None);
        // Unrelated PR untouched
        assert_eq!(store.resolve_commit(&sha('c')).await, Some(pr_id(2)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_prs_mutate_independently() {
        let store = Arc::new(PrStateStore::new());
        store.ensure(&pr_id(1), &sha('a'), None).await;
        store.ensure(&pr_id(2), &sha('b'), None).await;

        // Interleave mutations of the two PRs from concurrent tasks; the
        // final state of each must be exactly its own signals.
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let (id, context) = if i % 2 == 0 {
                    (pr_id(1), format!("one/{i}"))
                } else {
                    (pr_id(2), format!("two/{i}"))
                };
                store
                    .merge_field(&id, |s| s.set_check(context, true))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let one = store.snapshot(&pr_id(1)).await.unwrap();
        let two = store.snapshot(&pr_id(2)).await.unwrap();
        assert_eq!(one.checks.len(), 4);
        assert_eq!(two.checks.len(), 4);
        assert!(one.checks.keys().all(|k| k.starts_with("one/")));
        assert!(two.checks.keys().all(|k| k.starts_with("two/")));
    }

    #[tokio::test]
    async fn commit_index_follows_latest_advertiser() {
        let store = PrStateStore::new();
        store.ensure(&pr_id(1), &sha('a'), None).await;
        store.ensure(&pr_id(2), &sha('a'), None).await;

        // Last writer wins; the index is advisory.
        assert_eq!(store.resolve_commit(&sha('a')).await, Some(pr_id(2)));
    }
}
