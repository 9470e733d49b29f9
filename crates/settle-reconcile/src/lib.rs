//! # Settle Reconcile
//!
//! Converges a GitHub repository onto its [`settle_config::RepoConfig`].
//!
//! Each resource kind has its own reconciler:
//!
//! - [`repository`]: metadata (GraphQL mutation plus REST patch)
//! - [`collaborators`]: direct collaborators, sparing organization admins
//! - [`teams`]: team access
//! - [`branch_protection`]: branch-protection rules
//!
//! All of them match desired and observed state by natural key through
//! [`plan()`], which in turn uses [`missing`] to find what to delete.
//! [`Reconciler`] runs them in order against any [`settle_api::GitHubApi`].

pub mod branch_protection;
pub mod collaborators;
pub mod diff;
pub mod engine;
pub mod error;
pub mod plan;
pub mod repository;
pub mod teams;

#[cfg(test)]
mod fake;

pub use branch_protection::BranchProtectionReport;
pub use collaborators::CollaboratorReport;
pub use diff::missing;
pub use engine::{ReconcileReport, Reconciler};
pub use error::{ReconcileError, Result};
pub use plan::{plan, Plan, Step};
pub use teams::TeamReport;
