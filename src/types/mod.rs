//! Core domain types for the auto-merge bot.
//!
//! This module contains all the fundamental types used throughout the
//! application, designed to encode invariants via the type system.

pub mod ids;
pub mod pr;

// Re-export commonly used types at the module level
pub use ids::{PrId, PrNumber, RepoId, Sha};
pub use pr::PullRequestState;
