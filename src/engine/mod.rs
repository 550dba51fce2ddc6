//! The merge-readiness decision engine.
//!
//! The engine owns the PR state store and the provider gateway, and exposes a
//! single entry point, [`Engine::handle_event`], invoked once per inbound
//! webhook delivery. Each event is normalized by an ingestor, merged into the
//! store under that PR's exclusion scope, and immediately re-evaluated for
//! readiness; a ready PR is merged at most once per head-commit generation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::github::{Provider, ProviderError};
use crate::store::PrStateStore;
use crate::webhooks::Event;

pub mod ingest;
pub mod merge;
pub mod readiness;
pub mod refresh;
pub mod resolver;


pub use merge::MergeOutcome;
pub use resolver::ResolveError;

/// Tunables for the engine's provider interactions.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// How long to wait after a triggering event before asking the provider
    /// for its mergeability verdict. The provider computes mergeability
    /// asynchronously after a push; asking too early reads a false
    /// "not mergeable yet".
    pub mergeable_refresh_delay: Duration,

    /// Upper bound on any single provider call.
    pub provider_timeout: Duration,

    /// Whether to delete the source branch after a successful merge.
    pub delete_branch_after_merge: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            mergeable_refresh_delay: Duration::from_secs(10),
            provider_timeout: Duration::from_secs(30),
            delete_branch_after_merge: false,
        }
    }
}

/// The event-driven state-aggregation and merge decision engine.
///
/// Cheap to clone; clones share the same store and provider. Refresh tasks
/// hold a clone, so the engine outlives the request that spawned them.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: PrStateStore,
    provider: Arc<dyn Provider>,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(provider: Arc<dyn Provider>, settings: EngineSettings) -> Self {
        Engine {
            inner: Arc::new(EngineInner {
                store: PrStateStore::new(),
                provider,
                settings,
            }),
        }
    }

    /// Read access to the state store (observability and tests).
    pub fn store(&self) -> &PrStateStore {
        &self.inner.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    pub(crate) fn provider_ref(&self) -> &Arc<dyn Provider> {
        &self.inner.provider
    }

    /// Processes one inbound event to completion.
    ///
    /// Failures are contained here: an event that cannot be attributed or a
    /// provider hiccup is logged and dropped, never propagated to the
    /// transport layer, and never blocks events for other PRs.
    pub async fn handle_event(&self, event: Event) {
        match event {
            Event::Review(ev) => self.ingest_review(ev).await,
            Event::PullRequest(ev) => self.ingest_pull_request(ev).await,
            Event::Status(ev) => self.ingest_status(ev).await,
        }
    }

    /// Runs a provider call with the configured bound. A timeout surfaces as
    /// a transient provider error; the caller leaves cached state untouched.
    pub(crate) async fn bounded<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.inner.settings.provider_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::transient(format!(
                "provider call timed out after {:?}",
                self.inner.settings.provider_timeout
            ))),
        }
    }
}
