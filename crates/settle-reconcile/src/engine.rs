//! Runs the reconcilers for one repository, in order.

use std::fmt;

use settle_api::GitHubApi;
use settle_config::RepoConfig;

use crate::branch_protection::{self, BranchProtectionReport};
use crate::collaborators::{self, CollaboratorReport};
use crate::error::Result;
use crate::repository;
use crate::teams::{self, TeamReport};

/// Everything one pass changed on a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub repository: String,
    pub collaborators: CollaboratorReport,
    pub teams: TeamReport,
    pub branch_protection: BranchProtectionReport,
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: collaborators +{}/-{}, teams +{}/-{}, rules +{}/~{}/-{}",
            self.repository,
            self.collaborators.granted.len(),
            self.collaborators.removed.len(),
            self.teams.granted.len(),
            self.teams.removed.len(),
            self.branch_protection.created.len(),
            self.branch_protection.updated.len(),
            self.branch_protection.deleted.len(),
        )
    }
}

/// Converges repositories of one organization.
///
/// Steps run strictly in sequence (settings, collaborators, teams, branch
/// protection) and the first failure stops the repository. Nothing is
/// rolled back.
pub struct Reconciler<'a> {
    api: &'a dyn GitHubApi,
    org: String,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn GitHubApi, org: impl Into<String>) -> Self {
        Self {
            api,
            org: org.into(),
        }
    }

    /// Apply one repository's desired state.
    pub async fn apply(&self, config: &RepoConfig) -> Result<ReconcileReport> {
        let name = config.name();
        tracing::info!(org = %self.org, repo = name, "applying to repository");

        let repository_id = repository::fetch_repository_id(self.api, &self.org, name).await?;
        repository::update_repository(self.api, &self.org, &repository_id, &config.repository)
            .await?;

        let collaborators = collaborators::reconcile(self.api, &self.org, config).await?;
        let teams = teams::reconcile(self.api, &self.org, config).await?;
        let branch_protection =
            branch_protection::reconcile(self.api, &self.org, &repository_id, config).await?;

        Ok(ReconcileReport {
            repository: name.to_string(),
            collaborators,
            teams,
            branch_protection,
        })
    }
}
