//! Octocrab-backed provider implementation.
//!
//! Implementation notes:
//! - The merge call goes through the REST endpoint directly because
//!   octocrab's merge builder doesn't expose the `sha` guard parameter,
//!   and that guard is the whole point (it turns a racing push into an
//!   HTTP 409 instead of a merge of unreviewed code).
//! - `mergeable` on a fetched PR is tri-state on GitHub's side (`null` while
//!   still computing); anything but an explicit `true` is reported as false.
//! - No internal retries. Callers bound each call with a timeout and rely on
//!   the next webhook event as the retry.

use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::params::repos::Reference;
use serde::{Deserialize, Serialize};

use crate::types::{PrId, PrNumber, RepoId, Sha};

use super::error::ProviderError;
use super::provider::{OpenPrHead, PrSnapshot, Provider, ReviewRecord};

/// A GitHub API client implementing the provider gateway.
///
/// Unlike a per-repo client, this one serves every repository the webhook
/// endpoint reports events for, so each call carries its repo.
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a client from a pre-configured Octocrab instance.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates a client authenticated with a personal access token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    merge_method: &'static str,
    sha: &'a str,
}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    merged: bool,
    message: Option<String>,
}

#[async_trait]
impl Provider for GitHubClient {
    async fn get_pull_request(&self, pr: &PrId) -> Result<PrSnapshot, ProviderError> {
        let pull = self
            .client
            .pulls(&pr.repo.owner, &pr.repo.repo)
            .get(pr.number.0)
            .await
            .map_err(ProviderError::from_octocrab)?;

        Ok(PrSnapshot {
            head_sha: Sha::new(pull.head.sha),
            branch_ref: pull.head.ref_field,
            mergeable: pull.mergeable.unwrap_or(false),
            open: matches!(pull.state, Some(octocrab::models::IssueState::Open)),
        })
    }

    async fn list_reviews(&self, pr: &PrId) -> Result<Vec<ReviewRecord>, ProviderError> {
        let page = self
            .client
            .pulls(&pr.repo.owner, &pr.repo.repo)
            .list_reviews(pr.number.0)
            .per_page(100)
            .send()
            .await
            .map_err(ProviderError::from_octocrab)?;

        let records = page
            .items
            .into_iter()
            .filter_map(|review| {
                // Reviews without a user (e.g. from deleted accounts) can't
                // count toward readiness either way; skip them.
                let reviewer = review.user.as_ref().map(|u| u.login.clone())?;
                let approved = review
                    .state
                    .as_ref()
                    .is_some_and(|s| *s == octocrab::models::pulls::ReviewState::Approved);
                Some(ReviewRecord {
                    reviewer,
                    approved,
                    submitted_at: review.submitted_at,
                })
            })
            .collect();

        Ok(records)
    }

    async fn list_open_pull_requests(
        &self,
        repo: &RepoId,
    ) -> Result<Vec<OpenPrHead>, ProviderError> {
        let mut page_number = 1u32;
        let mut heads = Vec::new();

        loop {
            let page = self
                .client
                .pulls(&repo.owner, &repo.repo)
                .list()
                .state(octocrab::params::State::Open)
                .per_page(100)
                .page(page_number)
                .send()
                .await
                .map_err(ProviderError::from_octocrab)?;

            let items = page.items;
            let is_last_page = items.len() < 100;

            for pull in items {
                heads.push(OpenPrHead {
                    number: PrNumber(pull.number),
                    head_sha: Sha::new(pull.head.sha),
                });
            }

            if is_last_page {
                break;
            }
            page_number += 1;
        }

        Ok(heads)
    }

    async fn merge_pull_request(
        &self,
        pr: &PrId,
        expected_head: &Sha,
    ) -> Result<(), ProviderError> {
        let url = format!(
            "/repos/{}/{}/pulls/{}/merge",
            pr.repo.owner, pr.repo.repo, pr.number.0
        );

        let request = MergeRequest {
            merge_method: "merge",
            sha: expected_head.as_str(),
        };

        let result: Result<MergeResponse, _> = self.client.put(&url, Some(&request)).await;

        match result {
            Ok(response) if response.merged => Ok(()),
            Ok(response) => Err(ProviderError::permanent(format!(
                "merge request for {} returned merged=false: {}",
                pr,
                response.message.as_deref().unwrap_or("unknown reason")
            ))),
            Err(e) => Err(ProviderError::from_octocrab_merge(e)),
        }
    }

    async fn delete_branch_ref(
        &self,
        repo: &RepoId,
        branch_ref: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .repos(&repo.owner, &repo.repo)
            .delete_ref(&Reference::Branch(branch_ref.to_string()))
            .await
            .map_err(ProviderError::from_octocrab)
    }
}
