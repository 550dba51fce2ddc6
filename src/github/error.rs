//! Provider error types.
//!
//! Errors are categorized so the orchestrator can decide what a failure
//! means:
//!
//! - **Transient** — network trouble, timeouts, rate limits, 5xx. Nothing is
//!   retried automatically; the next incoming event is the retry.
//! - **MergeConflict** — the merge endpoint rejected the attempt (head moved
//!   past the expected SHA, or branch protection refused). The orchestrator
//!   rolls back its merge intent so a later event can try again.
//! - **Permanent** — everything else (auth failures, missing PRs, most 4xx).

use std::fmt;
use thiserror::Error;

use crate::types::{PrId, Sha};

/// The kind of provider error, categorized for the orchestrator's decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Network/timeout/rate-limit trouble. May succeed on a later event.
    Transient,

    /// The merge was rejected: expected head SHA no longer matches, or
    /// branch protection blocked the merge (HTTP 405/409 on the merge
    /// endpoint). Requires re-evaluation against fresh state, not a blind
    /// retry.
    MergeConflict,

    /// A failure that won't resolve on its own (bad auth, missing PR,
    /// other 4xx).
    Permanent,
}

/// A provider API error with enough context to log and categorize.
#[derive(Debug, Error)]
pub struct ProviderError {
    /// The error category.
    pub kind: ProviderErrorKind,

    /// The HTTP status code, if one could be determined.
    pub status_code: Option<u16>,

    /// Human-readable description.
    pub message: String,

    /// The underlying octocrab error, if any.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "provider error (HTTP {}): {}", code, self.message),
            None => write!(f, "provider error: {}", self.message),
        }
    }
}

impl ProviderError {
    /// Creates a transient error with no underlying API error (e.g. a local
    /// timeout).
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a permanent error with no underlying API error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a merge-conflict error for a rejected merge attempt.
    pub fn merge_conflict(pr: &PrId, expected_head: &Sha) -> Self {
        Self {
            kind: ProviderErrorKind::MergeConflict,
            status_code: Some(409),
            message: format!(
                "merge of {} rejected: expected head {} is stale or branch protection refused",
                pr,
                expected_head.short()
            ),
            source: None,
        }
    }

    /// Returns true for errors the next event may clear on its own.
    pub fn is_transient(&self) -> bool {
        self.kind == ProviderErrorKind::Transient
    }

    /// Categorizes an octocrab error by status code and message patterns.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = err.to_string();

        let kind = match status_code {
            Some(429) => ProviderErrorKind::Transient,
            Some(403) if is_rate_limit_message(&message) => ProviderErrorKind::Transient,
            Some(code) if (500..600).contains(&code) => ProviderErrorKind::Transient,
            Some(_) => ProviderErrorKind::Permanent,
            None => {
                if is_network_message(&message) {
                    ProviderErrorKind::Transient
                } else {
                    ProviderErrorKind::Permanent
                }
            }
        };

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Categorizes an octocrab error from the merge endpoint specifically,
    /// where 405 ("not mergeable") and 409 ("head branch was modified") both
    /// mean the merge must be re-evaluated, not retried blindly.
    pub fn from_octocrab_merge(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        if matches!(status_code, Some(405) | Some(409)) {
            let message = err.to_string();
            return Self {
                kind: ProviderErrorKind::MergeConflict,
                status_code,
                message,
                source: Some(err),
            };
        }
        Self::from_octocrab(err)
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// octocrab's `Error` only exposes the status directly on its `GitHub`
/// variant; for the rest we fall back to `None`, which categorizes
/// conservatively.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("api rate")
        || lower.contains("secondary rate")
        || lower.contains("abuse detection")
}

fn is_network_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("dns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrNumber, RepoId};

    #[test]
    fn rate_limit_message_detection() {
        assert!(is_rate_limit_message("API rate limit exceeded"));
        assert!(is_rate_limit_message("secondary rate limit hit"));
        assert!(!is_rate_limit_message("permission denied"));
    }

    #[test]
    fn network_message_detection() {
        assert!(is_network_message("connection refused"));
        assert!(is_network_message("request timed out"));
        assert!(!is_network_message("not found"));
    }

    #[test]
    fn transient_constructor_is_transient() {
        let err = ProviderError::transient("timed out after 30s");
        assert!(err.is_transient());
        assert_eq!(err.status_code, None);
    }

    #[test]
    fn merge_conflict_mentions_pr_and_sha() {
        let pr = PrId::new(RepoId::new("octocat", "hello-world"), PrNumber(3));
        let sha = Sha::new("a".repeat(40));
        let err = ProviderError::merge_conflict(&pr, &sha);

        assert_eq!(err.kind, ProviderErrorKind::MergeConflict);
        assert!(err.message.contains("octocat/hello-world#3"));
        assert!(err.message.contains(sha.short()));
        assert!(!err.is_transient());
    }
}
