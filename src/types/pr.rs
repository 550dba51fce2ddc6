//! Aggregated pull request state.
//!
//! `PullRequestState` is the bot's in-memory picture of a single PR, built up
//! incrementally from webhook events and provider refreshes. It is always
//! scoped to one observed head commit: when the head moves, every signal
//! recorded against the old commit is discarded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::Sha;

/// The aggregated state of a single pull request.
///
/// All signal fields (`checks`, `reviews`, `mergeable`, `completed`) are valid
/// only for `head_sha`. A head-commit change resets them; see
/// [`PullRequestState::observe_head`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestState {
    /// The most recently observed head commit of the PR branch.
    pub head_sha: Sha,

    /// The PR's source branch name. Used only for post-merge cleanup.
    pub branch_ref: String,

    /// Pass/fail verdict per check context (e.g. "ci/build" -> true).
    pub checks: HashMap<String, bool>,

    /// Approval verdict per reviewer login. A reviewer's most recent review
    /// always overwrites their previous entry; verdicts are never accumulated.
    pub reviews: HashMap<String, bool>,

    /// Cached provider verdict on whether the PR can merge cleanly.
    /// Defaults to false until the provider confirms otherwise.
    pub mergeable: bool,

    /// Whether a merge has been dispatched for this head-commit generation.
    /// Once set it is never cleared except by a merge failure or by removing
    /// the whole entry.
    pub completed: bool,
}

impl PullRequestState {
    /// Creates an empty state for a freshly observed head commit.
    pub fn new(head_sha: Sha, branch_ref: impl Into<String>) -> Self {
        PullRequestState {
            head_sha,
            branch_ref: branch_ref.into(),
            checks: HashMap::new(),
            reviews: HashMap::new(),
            mergeable: false,
            completed: false,
        }
    }

    /// Records that `head_sha` is the PR's current head commit.
    ///
    /// If the head moved, all accumulated signals are reset: checks and
    /// reviews recorded against a superseded commit must never count toward
    /// readiness of the new one. Returns true if a reset happened.
    pub fn observe_head(&mut self, head_sha: &Sha) -> bool {
        if &self.head_sha == head_sha {
            return false;
        }
        self.head_sha = head_sha.clone();
        self.checks.clear();
        self.reviews.clear();
        self.mergeable = false;
        self.completed = false;
        true
    }

    /// Records a check verdict for a named context, overwriting any prior one.
    pub fn set_check(&mut self, context: impl Into<String>, passed: bool) {
        self.checks.insert(context.into(), passed);
    }

    /// Records a reviewer's verdict, overwriting any prior one.
    pub fn set_review(&mut self, reviewer: impl Into<String>, approved: bool) {
        self.reviews.insert(reviewer.into(), approved);
    }

    /// Replaces the whole review map with the provider's authoritative list.
    pub fn replace_reviews(&mut self, reviews: HashMap<String, bool>) {
        self.reviews = reviews;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha(c: char) -> Sha {
        Sha::new(c.to_string().repeat(40))
    }

    #[test]
    fn new_state_is_empty_and_not_mergeable() {
        let state = PullRequestState::new(sha('a'), "feature");
        assert!(state.checks.is_empty());
        assert!(state.reviews.is_empty());
        assert!(!state.mergeable);
        assert!(!state.completed);
    }

    #[test]
    fn observe_same_head_keeps_signals() {
        let mut state = PullRequestState::new(sha('a'), "feature");
        state.set_check("ci", true);
        state.set_review("alice", true);
        state.mergeable = true;

        let reset = state.observe_head(&sha('a'));

        assert!(!reset);
        assert_eq!(state.checks.get("ci"), Some(&true));
        assert_eq!(state.reviews.get("alice"), Some(&true));
        assert!(state.mergeable);
    }

    #[test]
    fn observe_new_head_resets_all_signals() {
        let mut state = PullRequestState::new(sha('a'), "feature");
        state.set_check("ci", true);
        state.set_review("alice", true);
        state.mergeable = true;
        state.completed = true;

        let reset = state.observe_head(&sha('b'));

        assert!(reset);
        assert_eq!(state.head_sha, sha('b'));
        assert!(state.checks.is_empty());
        assert!(state.reviews.is_empty());
        assert!(!state.mergeable);
        assert!(!state.completed);
    }

    #[test]
    fn set_check_overwrites_prior_verdict() {
        let mut state = PullRequestState::new(sha('a'), "feature");
        state.set_check("ci", false);
        state.set_check("ci", true);
        assert_eq!(state.checks.len(), 1);
        assert_eq!(state.checks.get("ci"), Some(&true));
    }

    #[test]
    fn set_review_overwrites_prior_verdict() {
        let mut state = PullRequestState::new(sha('a'), "feature");
        state.set_review("alice", true);
        state.set_review("alice", false);
        assert_eq!(state.reviews.len(), 1);
        assert_eq!(state.reviews.get("alice"), Some(&false));
    }
}
