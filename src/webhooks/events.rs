//! Typed webhook events.
//!
//! The bot consumes three event kinds, normalized from GitHub's webhook
//! payloads:
//!
//! - `pull_request_review` — a reviewer submitted a verdict
//! - `pull_request` — PR lifecycle (opened, synchronize, reopened, edited, closed)
//! - `status` — a commit status (legacy Status API) changed for some commit
//!
//! Review and pull-request events identify their PR directly; status events
//! carry only a commit SHA and must be resolved through the commit index.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoId, Sha};

/// A parsed webhook event the bot acts on.
///
/// Event types outside these three are ignored by the parser (`Ok(None)`),
/// not represented here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A review was submitted on a PR.
    Review(ReviewSubmittedEvent),

    /// A PR was opened, updated, or closed.
    PullRequest(PrUpdatedEvent),

    /// A commit status changed.
    Status(CheckStatusEvent),
}

impl Event {
    /// Returns the repository this event belongs to.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            Event::Review(e) => &e.repo,
            Event::PullRequest(e) => &e.repo,
            Event::Status(e) => &e.repo,
        }
    }
}

/// A reviewer's verdict as delivered in a review event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Reviewer approved the PR.
    Approved,
    /// Reviewer requested changes.
    ChangesRequested,
    /// Reviewer commented without a verdict.
    Commented,
    /// A previous review was dismissed.
    Dismissed,
    /// Review is pending (not yet submitted).
    Pending,
}

impl ReviewState {
    /// Only an explicit approval counts toward readiness.
    pub fn is_approval(&self) -> bool {
        matches!(self, ReviewState::Approved)
    }
}

/// A submitted pull request review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmittedEvent {
    /// The repository.
    pub repo: RepoId,

    /// The PR the review was submitted on.
    pub pr_number: PrNumber,

    /// The PR's head commit at delivery time.
    pub head_sha: Sha,

    /// The PR's source branch name.
    pub branch_ref: String,

    /// The reviewer's login.
    pub reviewer: String,

    /// The submitted verdict.
    pub state: ReviewState,
}

/// Action performed on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// PR was opened.
    Opened,
    /// PR head was updated (new commits pushed).
    Synchronize,
    /// PR was reopened.
    Reopened,
    /// PR title/body/base changed.
    Edited,
    /// PR was closed (merged or abandoned).
    Closed,
}

/// A pull request lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrUpdatedEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: PrAction,

    /// The PR number.
    pub pr_number: PrNumber,

    /// The PR's head commit at delivery time.
    pub head_sha: Sha,

    /// The PR's source branch name.
    pub branch_ref: String,
}

/// State of a commit status, as reported by CI.
///
/// GitHub documents `success`, `pending`, `failure`, and `error`; anything
/// else is preserved as `Unrecognized` and treated as not passing rather
/// than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Success,
    Pending,
    Failure,
    Error,
    /// A state string outside GitHub's documented set.
    Unrecognized(String),
}

impl CheckState {
    /// Classifies a raw state string. Never fails: unknown strings map to
    /// `Unrecognized`, which the ingestor logs as a data-quality warning.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "success" => CheckState::Success,
            "pending" => CheckState::Pending,
            "failure" => CheckState::Failure,
            "error" => CheckState::Error,
            other => CheckState::Unrecognized(other.to_string()),
        }
    }

    /// Only `success` counts as a passing signal.
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckState::Success)
    }
}

/// A commit status event. Carries no PR identity — only the commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStatusEvent {
    /// The repository.
    pub repo: RepoId,

    /// The commit the status applies to.
    pub sha: Sha,

    /// The check context name (e.g. "ci/build").
    pub context: String,

    /// The reported state.
    pub state: CheckState,
}
