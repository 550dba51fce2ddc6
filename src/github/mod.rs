//! Provider gateway: the GitHub API boundary.
//!
//! The engine talks to GitHub exclusively through the [`Provider`] trait,
//! which keeps the decision logic testable against a mock. The production
//! implementation is [`GitHubClient`], backed by octocrab.

pub mod client;
pub mod error;
pub mod provider;

pub use client::GitHubClient;
pub use error::{ProviderError, ProviderErrorKind};
pub use provider::{OpenPrHead, PrSnapshot, Provider, ReviewRecord};
