//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON into typed [`Event`] values.
//!
//! # Parsing strategy
//!
//! 1. The event type comes from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types and irrelevant actions return `Ok(None)`
//! 4. Malformed payloads return `Err` with details; the caller logs and
//!    drops them without crashing the pipeline

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoId, Sha};

use super::events::{
    CheckState, CheckStatusEvent, Event, PrAction, PrUpdatedEvent, ReviewState,
    ReviewSubmittedEvent,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Field has a value we cannot interpret.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// Returns `Ok(Some(event))` for the three event kinds the bot acts on,
/// `Ok(None)` for everything else (unknown event types, irrelevant actions),
/// and `Err` for payloads that should have parsed but didn't.
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<Event>, ParseError> {
    match event_type {
        "pull_request_review" => parse_review(payload),
        "pull_request" => parse_pull_request(payload),
        "status" => parse_status(payload).map(|e| Some(Event::Status(e))),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Optional fields are validated
// explicitly where the bot requires them.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    head: RawRef,
}

// ============================================================================
// pull_request_review event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawReviewPayload {
    action: String,
    review: RawReview,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    user: RawUser,
    state: String,
}

fn parse_review(payload: &[u8]) -> Result<Option<Event>, ParseError> {
    let raw: RawReviewPayload = serde_json::from_slice(payload)?;

    // Only submitted reviews carry a verdict worth ingesting; dismissals and
    // edits are picked up by the authoritative provider refresh.
    if raw.action != "submitted" {
        return Ok(None);
    }

    let state = match raw.review.state.to_lowercase().as_str() {
        "approved" => ReviewState::Approved,
        "changes_requested" => ReviewState::ChangesRequested,
        "commented" => ReviewState::Commented,
        "dismissed" => ReviewState::Dismissed,
        "pending" => ReviewState::Pending,
        other => {
            return Err(ParseError::InvalidField {
                field: "review.state",
                value: other.to_string(),
            });
        }
    };

    Ok(Some(Event::Review(ReviewSubmittedEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        pr_number: PrNumber(raw.pull_request.number),
        head_sha: Sha::new(raw.pull_request.head.sha),
        branch_ref: raw.pull_request.head.ref_name,
        reviewer: raw.review.user.login,
        state,
    })))
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<Event>, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => PrAction::Opened,
        "synchronize" => PrAction::Synchronize,
        "reopened" => PrAction::Reopened,
        "edited" => PrAction::Edited,
        "closed" => PrAction::Closed,
        // Labels, assignments, draft toggles etc. don't affect readiness
        _ => return Ok(None),
    };

    Ok(Some(Event::PullRequest(PrUpdatedEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action,
        pr_number: PrNumber(raw.pull_request.number),
        head_sha: Sha::new(raw.pull_request.head.sha),
        branch_ref: raw.pull_request.head.ref_name,
    })))
}

// ============================================================================
// status event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawStatusPayload {
    sha: String,
    context: String,
    state: String,
    repository: RawRepository,
}

fn parse_status(payload: &[u8]) -> Result<CheckStatusEvent, ParseError> {
    let raw: RawStatusPayload = serde_json::from_slice(payload)?;

    Ok(CheckStatusEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        sha: Sha::new(raw.sha),
        context: raw.context,
        // classify never fails: unknown states become Unrecognized
        state: CheckState::classify(&raw.state),
    })
}
