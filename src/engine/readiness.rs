//! The merge-readiness predicate.
//!
//! Pure functions over a PR's aggregated state, no side effects. The policy
//! is fail-closed: an empty review or check map means "no signal yet", which
//! is never ready — readiness requires positive evidence on every axis.

use crate::types::PullRequestState;

/// True when every gating condition holds simultaneously:
/// not already dispatched, provider-confirmed mergeable, at least one review
/// and all approving, at least one check and all passing.
pub fn ready(state: &PullRequestState) -> bool {
    !state.completed
        && state.mergeable
        && reviews_all_approved(state)
        && checks_all_passed(state)
}

/// Non-empty review map with every verdict an approval.
pub fn reviews_all_approved(state: &PullRequestState) -> bool {
    !state.reviews.is_empty() && state.reviews.values().all(|approved| *approved)
}

/// Non-empty check map with every context passing.
pub fn checks_all_passed(state: &PullRequestState) -> bool {
    !state.checks.is_empty() && state.checks.values().all(|passed| *passed)
}
